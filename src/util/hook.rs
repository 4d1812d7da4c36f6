use crate::ui::tui;

/// Restores the terminal before the default panic report is printed.
pub fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::Tui::restore();
        tracing::error!(%panic_info, "panic");
        hook(panic_info);
    }));
}
