pub mod order_reader;
pub mod outcome_writer;
