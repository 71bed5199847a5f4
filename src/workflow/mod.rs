pub mod generation_flow;

pub use generation_flow::QuestionGenerationPipeline;
