mod descriptor;
mod pairing_state;
mod store;
mod transport;
