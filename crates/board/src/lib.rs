pub mod config;
pub mod server;
pub mod store;
pub mod sync;

// Load .env before main runs so config reads see the file values.
#[ctor::ctor]
fn load_env() {
    dotenv::dotenv().ok();
}
