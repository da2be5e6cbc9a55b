pub mod inference_result;

pub use inference_result::{consume_inference_results, handle_inference_result};
