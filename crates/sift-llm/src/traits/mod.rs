mod transport;

pub use transport::ChatTransport;
