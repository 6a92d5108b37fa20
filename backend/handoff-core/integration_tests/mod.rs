mod broadcaster;
mod config;
mod error;
mod helpers;
mod pairing;
mod responder;
mod store;
mod transport;
