pub mod vendor_application;
