pub use relay_service::RelayService;

pub mod relay_service;
