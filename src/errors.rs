use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("workload failed: {0}")]
    Workload(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("data format error: {0}")]
    DataFormat(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("render error: {0}")]
    Render(String),
}

impl BenchError {
    pub fn workload<T: Into<String>>(msg: T) -> Self {
        BenchError::Workload(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidInput(msg.into())
    }

    pub fn data_format<T: Into<String>>(msg: T) -> Self {
        BenchError::DataFormat(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        BenchError::Io(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        BenchError::Render(msg.into())
    }
}
