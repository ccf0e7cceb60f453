mod params_tests;
mod reader_tests;
mod writer_tests;
