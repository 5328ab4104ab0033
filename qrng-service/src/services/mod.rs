pub mod anu_service;
pub mod pseudo_service;

pub use anu_service::AnuQrngService;
pub use pseudo_service::PseudoRandom;
