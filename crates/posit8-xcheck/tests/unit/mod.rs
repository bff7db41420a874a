mod device_protocol;
mod error_coverage;
