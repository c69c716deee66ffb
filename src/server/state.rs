use crate::lookup::CepResolver;

pub struct AppState {
    pub resolver: CepResolver,
}
