use crate::entity::Resource;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub ui: UiState,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub current_route: Route,
    pub sidebar_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List(Resource),
    Detail(Resource, String),
    Create(Resource),
}

impl Default for Route {
    fn default() -> Self {
        Route::List(Resource::BROWSABLE[0])
    }
}

impl Route {
    pub fn resource(&self) -> Resource {
        match self {
            Route::List(resource) | Route::Detail(resource, _) | Route::Create(resource) => *resource,
        }
    }

    /// Breadcrumb shown above the content pane.
    pub fn title(&self) -> String {
        match self {
            Route::List(resource) => resource.label().to_string(),
            Route::Detail(resource, id) => format!("{} / {id}", resource.label()),
            Route::Create(resource) => format!("{} / new {}", resource.label(), resource.singular()),
        }
    }
}
