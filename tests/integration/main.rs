mod driver;
mod helpers;
mod server;
