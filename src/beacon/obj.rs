use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{error, info};
use nalgebra::Point3;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::mesh::Mesh;
use crate::beacon::scene::Material;
use crate::error::{Error, Result};

/// Vertices and 0-based faces read from a mesh file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

/// Reads `v` and `f` records, ignoring every other kind of line.
///
/// Both the vertex and the face count may reach `limit`; the record that would
/// take either past it aborts the parse with [`Error::MeshTooLarge`].
pub fn parse_mesh<R: BufRead>(reader: R, limit: usize) -> Result<MeshData> {
    let mut data = MeshData::default();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let [x, y, z] = fields::<f32>(&mut tokens, number)?;
                data.vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let indices = fields::<usize>(&mut tokens, number)?;
                let mut face = [0; 3];
                for (slot, index) in face.iter_mut().zip(indices) {
                    if index == 0 || index > data.vertices.len() {
                        return Err(Error::InvalidFaceIndex {
                            line: number,
                            index,
                            vertices: data.vertices.len(),
                        });
                    }
                    *slot = index - 1;
                }
                data.faces.push(face);
            }
            _ => continue,
        }

        if data.vertices.len() > limit || data.faces.len() > limit {
            error!("Too many vertices or indices in mesh file! Maximum is {limit}");
            return Err(Error::MeshTooLarge { max: limit });
        }
    }

    Ok(data)
}

// Face tokens may carry texture/normal references (`1/2/3`), only the vertex counts.
fn fields<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[T; 3]> {
    let mut parse = || -> Result<T> {
        let token = tokens.next().ok_or_else(|| Error::Parse {
            line,
            message: "expected three fields".to_string(),
        })?;
        let value = token.split('/').next().unwrap_or(token);
        value.parse::<T>().map_err(|_| Error::Parse {
            line,
            message: format!("cannot parse `{token}`"),
        })
    };

    Ok([parse()?, parse()?, parse()?])
}

/// Appends every face as a neutral white triangle under `mesh`.
///
/// On failure the triangle count is rolled back to where it started and the
/// mesh stays unloaded.
pub fn append_mesh(buffer: &mut ObjectBuffer, data: &MeshData, mesh: &mut Mesh) -> Result<()> {
    mesh.was_loaded = false;

    // Hand-built data never went through the parser's index checks
    for (face, indices) in data.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&index| index >= data.vertices.len()) {
            let vertices = data.vertices.len();
            error!("Face {face} references vertex {index}, but the mesh holds {vertices}");
            return Err(Error::FaceOutOfRange {
                face,
                index,
                vertices,
            });
        }
    }

    let first = buffer.num_triangles();
    for face in &data.faces {
        let [a, b, c] = face.map(|index| data.vertices[index]);
        if let Err(error) = buffer.create_triangle(a, b, c, Material::default()) {
            buffer.truncate_triangles(first);
            return Err(error);
        }
    }

    info!("Loaded mesh with {} triangles", data.faces.len());
    info!("Currently {} triangles in total", buffer.num_triangles());

    mesh.triangles = first..buffer.num_triangles();
    mesh.center = Point3::origin();
    mesh.was_loaded = true;
    Ok(())
}

pub fn load_mesh(buffer: &mut ObjectBuffer, path: impl AsRef<Path>, mesh: &mut Mesh) -> Result<()> {
    mesh.was_loaded = false;

    let file = File::open(path.as_ref()).map_err(|error| {
        error!("Could not open mesh file {}: {error}", path.as_ref().display());
        error
    })?;
    let data = parse_mesh(BufReader::new(file), buffer.max_triangles()).map_err(|error| {
        error!("Could not parse mesh file {}: {error}", path.as_ref().display());
        error
    })?;

    append_mesh(buffer, &data, mesh)
}
