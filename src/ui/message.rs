#[derive(Debug, Clone)]
pub enum AppMessage {
    Quit,

    // Navigation
    GoBack,
    NextSidebarItem,
    PreviousSidebarItem,
    SetSidebarIndex(usize),
}
