pub mod telemetry_test;
