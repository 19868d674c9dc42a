pub mod cli;
pub mod config;
pub mod consts;
pub mod image;
pub mod operator;
pub mod platform;
pub mod pod_spec;
pub mod relation;
pub mod state;
pub mod variant;
mod shadow {
    #![allow(clippy::needless_raw_string_hashes)]
    use shadow_rs::shadow;
    shadow!(build);

    pub use self::build::*;
}
