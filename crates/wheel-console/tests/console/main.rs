mod client_test;
mod gate_test;
mod handlers_test;
mod service_test;
