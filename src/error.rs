use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Too many spheres, maximum is {max}")]
    TooManySpheres { max: usize },

    #[error("Too many triangles, maximum is {max}")]
    TooManyTriangles { max: usize },

    /// Vertex or face count of a mesh file went past the triangle capacity
    #[error("Too many vertices or indices in mesh file, maximum is {max}")]
    MeshTooLarge { max: usize },

    #[error("Malformed mesh record on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Face on line {line} references vertex {index}, but only {vertices} are declared")]
    InvalidFaceIndex {
        line: usize,
        index: usize,
        vertices: usize,
    },

    #[error("Face {face} references vertex {index}, but the mesh holds {vertices}")]
    FaceOutOfRange {
        face: usize,
        index: usize,
        vertices: usize,
    },

    #[error("Mesh range {first}..={last} overlaps an already registered mesh")]
    OverlappingMesh { first: usize, last: usize },

    #[error("Frame buffer is not complete: {0}")]
    FrameBuffer(String),

    #[error("GPU setup failed: {0}")]
    Gpu(String),

    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
