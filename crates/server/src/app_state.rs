use crate::api::CatalogRepository;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repository: CatalogRepository,
}
