pub mod apilayer;

pub use apilayer::ApiLayerProvider;
