//! Wavefront OBJ + MTL reader.
//!
//! Supports what the viewer's assets use: `v`, `vt`, polygonal `f` records in
//! every index form (fanned into triangles, negative indices resolved against
//! the current count), `mtllib`, and the MTL color/shininess/map statements.
//! Normals in the file are ignored; they are recomputed from the geometry.

use std::fmt;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

#[derive(Debug)]
pub enum ObjError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { line: usize, message: String },
    IndexOutOfRange { kind: &'static str, index: i64, count: usize },
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            ObjError::Parse { line, message } => write!(f, "line {line}: {message}"),
            ObjError::IndexOutOfRange { kind, index, count } => {
                write!(f, "{kind} index {index} out of range ({count} defined)")
            }
        }
    }
}

impl std::error::Error for ObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn parse_err(line: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line,
        message: message.into(),
    }
}

/// One triangle: zero-based position indices plus optional texcoord indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObjFace {
    pub positions: [u32; 3],
    pub tex_coords: [Option<u32>; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    /// `Kd`
    pub diffuse: Vec3,
    /// `Ks`
    pub specular: Vec3,
    /// `Ka`
    pub ambient: Vec3,
    /// `Ns`
    pub shininess: f32,
    pub diffuse_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
}

impl ObjMaterial {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            ambient: Vec3::ZERO,
            shininess: 0.0,
            diffuse_map: None,
            specular_map: None,
        }
    }
}

/// Parsed geometry and materials of one OBJ file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshSource {
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub faces: Vec<ObjFace>,
    pub materials: Vec<ObjMaterial>,
    /// `mtllib` references, as written.
    pub material_libs: Vec<String>,
}

impl MeshSource {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Area-weighted smooth normals, one per position.
    pub fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let [a, b, c] = face.positions.map(|i| self.positions[i as usize]);
            // The cross product's length is twice the triangle area.
            let n = (b - a).cross(c - a);
            for i in face.positions {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }
}

/// Reads an OBJ file and the MTL libraries it references.
///
/// Texture map paths are resolved relative to the OBJ's directory.
pub fn load_obj(path: &Path) -> Result<MeshSource, ObjError> {
    let text = read(path)?;
    let mut source = parse_obj(&text)?;
    let dir = path.parent().unwrap_or(Path::new(""));

    for lib in source.material_libs.clone() {
        let lib_path = dir.join(&lib);
        let mut materials = parse_mtl(&read(&lib_path)?)?;
        for m in &mut materials {
            m.diffuse_map = m.diffuse_map.take().map(|p| dir.join(p));
            m.specular_map = m.specular_map.take().map(|p| dir.join(p));
        }
        source.materials.extend(materials);
    }

    log::debug!(
        "loaded {}: {} positions, {} faces, {} materials",
        path.display(),
        source.positions.len(),
        source.faces.len(),
        source.materials.len()
    );
    Ok(source)
}

fn read(path: &Path) -> Result<String, ObjError> {
    std::fs::read_to_string(path).map_err(|source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses OBJ text. Material libraries are recorded but not read.
pub fn parse_obj(text: &str) -> Result<MeshSource, ObjError> {
    let mut out = MeshSource::default();
    // Raw (position, texcoord) index pairs, validated once all records are read.
    let mut corners: Vec<[(i64, Option<i64>); 3]> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else { continue };

        match keyword {
            "v" => out.positions.push(parse_vec3(&mut parts, line_no)?),
            "vt" => {
                let u = parse_f32(parts.next(), line_no)?;
                let v = parts.next().map(|s| parse_f32(Some(s), line_no)).transpose()?;
                out.tex_coords.push(Vec2::new(u, v.unwrap_or(0.0)));
            }
            "f" => {
                let mut polygon = Vec::new();
                for token in parts {
                    polygon.push(parse_corner(
                        token,
                        line_no,
                        out.positions.len(),
                        out.tex_coords.len(),
                    )?);
                }
                if polygon.len() < 3 {
                    return Err(parse_err(line_no, "face needs at least 3 vertices"));
                }
                for k in 1..polygon.len() - 1 {
                    corners.push([polygon[0], polygon[k], polygon[k + 1]]);
                }
            }
            "mtllib" => {
                let name = line[keyword.len()..].trim();
                if name.is_empty() {
                    return Err(parse_err(line_no, "mtllib without a file name"));
                }
                out.material_libs.push(name.to_string());
            }
            // Normals are recomputed; grouping and smoothing are irrelevant here.
            _ => {}
        }
    }

    let np = out.positions.len();
    let nt = out.tex_coords.len();
    for tri in corners {
        let mut face = ObjFace {
            positions: [0; 3],
            tex_coords: [None; 3],
        };
        for (j, (p, t)) in tri.into_iter().enumerate() {
            face.positions[j] = checked_index("position", p, np)?;
            face.tex_coords[j] = t.map(|t| checked_index("texcoord", t, nt)).transpose()?;
        }
        out.faces.push(face);
    }

    Ok(out)
}

/// Parses MTL text.
pub fn parse_mtl(text: &str) -> Result<Vec<ObjMaterial>, ObjError> {
    let mut materials: Vec<ObjMaterial> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else { continue };

        if keyword == "newmtl" {
            let name = line[keyword.len()..].trim();
            materials.push(ObjMaterial::named(name));
            continue;
        }

        let known = matches!(keyword, "Kd" | "Ks" | "Ka" | "Ns" | "map_Kd" | "map_Ks");
        if !known {
            continue;
        }
        let Some(current) = materials.last_mut() else {
            return Err(parse_err(line_no, format!("`{keyword}` before any newmtl")));
        };

        match keyword {
            "Kd" => current.diffuse = parse_vec3(&mut parts, line_no)?,
            "Ks" => current.specular = parse_vec3(&mut parts, line_no)?,
            "Ka" => current.ambient = parse_vec3(&mut parts, line_no)?,
            "Ns" => current.shininess = parse_f32(parts.next(), line_no)?,
            "map_Kd" => current.diffuse_map = Some(map_path(parts, line_no)?),
            "map_Ks" => current.specular_map = Some(map_path(parts, line_no)?),
            _ => {}
        }
    }

    Ok(materials)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn parse_f32(token: Option<&str>, line: usize) -> Result<f32, ObjError> {
    let token = token.ok_or_else(|| parse_err(line, "missing number"))?;
    token
        .parse()
        .map_err(|_| parse_err(line, format!("invalid number `{token}`")))
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, ObjError> {
    let x = parse_f32(parts.next(), line)?;
    let y = parse_f32(parts.next(), line)?;
    let z = parse_f32(parts.next(), line)?;
    Ok(Vec3::new(x, y, z))
}

/// The file name of a `map_*` statement; leading options (`-s 1 1 1`) are skipped.
fn map_path<'a>(parts: impl Iterator<Item = &'a str>, line: usize) -> Result<PathBuf, ObjError> {
    parts
        .last()
        .map(PathBuf::from)
        .ok_or_else(|| parse_err(line, "texture map without a file name"))
}

/// Resolves one `v[/vt[/vn]]` token. Negative indices count back from the
/// elements defined so far; positive ones are checked after parsing.
fn parse_corner(
    token: &str,
    line: usize,
    positions_so_far: usize,
    tex_coords_so_far: usize,
) -> Result<(i64, Option<i64>), ObjError> {
    let mut fields = token.split('/');
    let p = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| parse_err(line, format!("invalid face vertex `{token}`")))?;
    let p = resolve(p, line, positions_so_far)?;

    let t = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve(s, line, tex_coords_so_far)?),
        _ => None,
    };

    Ok((p, t))
}

fn resolve(token: &str, line: usize, so_far: usize) -> Result<i64, ObjError> {
    let index: i64 = token
        .parse()
        .map_err(|_| parse_err(line, format!("invalid index `{token}`")))?;
    match index {
        0 => Err(parse_err(line, "indices are 1-based; 0 is invalid")),
        i if i > 0 => Ok(i - 1),
        i => Ok(so_far as i64 + i),
    }
}

fn checked_index(kind: &'static str, index: i64, count: usize) -> Result<u32, ObjError> {
    if index < 0 || index as usize >= count {
        return Err(ObjError::IndexOutOfRange { kind, index, count });
    }
    Ok(index as u32)
}
