//! Line oriented OBJ reader producing an expanded triangle soup.
//!
//! Every face corner is written out in full, so vertices shared between triangles are
//! duplicated. Malformed input is reported as [`ObjWarning`]s and skipped; ingestion
//! never stops early.

use crate::geometry::Fp;
use arrayvec::ArrayVec;
use std::fmt;
use std::num::NonZeroUsize;
use thiserror::Error;

/// Flat attribute arrays, one entry per emitted triangle corner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMeshData {
    /// x, y, z per corner.
    pub position: Vec<Fp>,
    /// u, v per corner.
    pub texcoord: Vec<Fp>,
    /// x, y, z per corner.
    pub normal: Vec<Fp>,
}

impl ObjMeshData {
    pub fn triangle_count(&self) -> usize {
        self.position.len() / 9
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repository {
    Position,
    Texcoord,
    Normal,
}

impl Repository {
    fn keyword(self) -> &'static str {
        match self {
            Repository::Position => "v",
            Repository::Texcoord => "vt",
            Repository::Normal => "vn",
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ObjWarningKind {
    #[error("invalid float in record: {keyword} {token}")]
    InvalidFloat { keyword: &'static str, token: String },
    #[error("invalid record arity: {keyword} (count={count})")]
    BadArity { keyword: &'static str, count: usize },
    #[error("face cannot be mapped to a triangle, it has {count} vertices")]
    NonTriangularFace { count: usize },
    #[error("the {repository} index is not an integer: '{token}'")]
    NonIntegerIndex { repository: Repository, token: String },
    #[error("the {repository} index {index} is invalid, relative indices are not supported")]
    NegativeIndex { repository: Repository, index: i64 },
    #[error("the {repository} index {index} is out of range, {available} records declared")]
    IndexOutOfRange {
        repository: Repository,
        index: i64,
        available: usize,
    },
    #[error("face (f {reference}) uses an undefined vertex position, face dropped")]
    UndefinedPosition { reference: String },
    #[error("undefined keyword: {keyword}")]
    UnknownKeyword { keyword: String },
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("line {line}: {kind}")]
pub struct ObjWarning {
    pub line: usize,
    pub kind: ObjWarningKind,
}

#[derive(Clone, Debug, Default)]
pub struct ObjParseOutput {
    pub mesh: ObjMeshData,
    pub warnings: Vec<ObjWarning>,
}

/// Record components beyond the third are never read, so they are not kept.
type Record = ArrayVec<Fp, 3>;

#[derive(Clone, Copy, Debug)]
struct Corner {
    position: NonZeroUsize,
    texcoord: Option<NonZeroUsize>,
    normal: Option<NonZeroUsize>,
}

#[derive(Default)]
struct ObjReader {
    positions: Vec<Record>,
    normals: Vec<Record>,
    texcoords: Vec<Record>,
    mesh: ObjMeshData,
    warnings: Vec<ObjWarning>,
    line: usize,
}

pub fn parse_obj(text: &str) -> ObjParseOutput {
    let mut reader = ObjReader::default();
    for (line_index, raw_line) in text.lines().enumerate() {
        reader.line = line_index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        match keyword {
            "v" => reader.handle_record(Repository::Position, rest),
            "vn" => reader.handle_record(Repository::Normal, rest),
            "vt" => reader.handle_record(Repository::Texcoord, rest),
            "f" => reader.handle_face(rest),
            _ => reader.warn(ObjWarningKind::UnknownKeyword {
                keyword: keyword.to_string(),
            }),
        }
    }
    log::debug!(
        "obj: {} positions, {} normals, {} texcoords, {} triangles, {} warnings",
        reader.positions.len(),
        reader.normals.len(),
        reader.texcoords.len(),
        reader.mesh.triangle_count(),
        reader.warnings.len()
    );
    ObjParseOutput {
        mesh: reader.mesh,
        warnings: reader.warnings,
    }
}

/// `1/ /1` is read as `1//1`. Whitespace is only dropped before a `/`, so trailing
/// slashes as in `1/ 2/ 3/` still separate references.
fn collapse_reference_spacing(rest: &str) -> String {
    let mut result = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            if chars.peek() != Some(&'/') {
                result.push(' ');
            }
        } else {
            result.push(c);
        }
    }
    result
}

impl ObjReader {
    fn warn(&mut self, kind: ObjWarningKind) {
        self.warnings.push(ObjWarning {
            line: self.line,
            kind,
        });
    }

    fn repository(&self, repository: Repository) -> &Vec<Record> {
        match repository {
            Repository::Position => &self.positions,
            Repository::Texcoord => &self.texcoords,
            Repository::Normal => &self.normals,
        }
    }

    fn handle_record(&mut self, repository: Repository, rest: &str) {
        let keyword = repository.keyword();
        let mut record = Record::new();
        let mut count = 0;
        for token in rest.split_whitespace() {
            let Ok(value) = token.parse::<Fp>() else {
                self.warn(ObjWarningKind::InvalidFloat {
                    keyword,
                    token: token.to_string(),
                });
                return;
            };
            if !record.is_full() {
                record.push(value);
            }
            count += 1;
        }
        let valid_arity = match repository {
            Repository::Texcoord => count == 2,
            Repository::Position | Repository::Normal => (2..=3).contains(&count),
        };
        if !valid_arity {
            self.warn(ObjWarningKind::BadArity { keyword, count });
        }
        match repository {
            Repository::Position => self.positions.push(record),
            Repository::Texcoord => self.texcoords.push(record),
            Repository::Normal => self.normals.push(record),
        }
    }

    /// Maps one sub-field of a face reference to a 1-based repository index.
    fn resolve_index(&mut self, repository: Repository, field: &str) -> Option<NonZeroUsize> {
        if field.is_empty() {
            return None;
        }
        let Ok(index) = field.parse::<i64>() else {
            self.warn(ObjWarningKind::NonIntegerIndex {
                repository,
                token: field.to_string(),
            });
            return None;
        };
        if index < 0 {
            self.warn(ObjWarningKind::NegativeIndex { repository, index });
            return None;
        }
        let available = self.repository(repository).len();
        match usize::try_from(index) {
            Ok(resolved) if resolved <= available => NonZeroUsize::new(resolved),
            _ => {
                self.warn(ObjWarningKind::IndexOutOfRange {
                    repository,
                    index,
                    available,
                });
                None
            }
        }
    }

    fn resolve_corner(&mut self, reference: &str) -> Option<Corner> {
        let mut fields = reference.split('/');
        let position_field = fields.next().unwrap_or("");
        let texcoord_field = fields.next().unwrap_or("");
        let normal_field = fields.next().unwrap_or("");

        let position = self.resolve_index(Repository::Position, position_field);
        let texcoord = self.resolve_index(Repository::Texcoord, texcoord_field);
        let normal = self.resolve_index(Repository::Normal, normal_field);
        match position {
            Some(position) => Some(Corner {
                position,
                texcoord,
                normal,
            }),
            None => {
                self.warn(ObjWarningKind::UndefinedPosition {
                    reference: reference.to_string(),
                });
                None
            }
        }
    }

    fn handle_face(&mut self, rest: &str) {
        let collapsed = collapse_reference_spacing(rest);
        let references: Vec<&str> = collapsed.split_whitespace().collect();
        if references.len() != 3 {
            self.warn(ObjWarningKind::NonTriangularFace {
                count: references.len(),
            });
            return;
        }
        let mut corners = ArrayVec::<Corner, 3>::new();
        for reference in references {
            if let Some(corner) = self.resolve_corner(reference) {
                corners.push(corner);
            }
        }
        if corners.is_full() {
            for corner in corners {
                self.emit_corner(corner);
            }
        }
    }

    fn emit_corner(&mut self, corner: Corner) {
        let component = |record: &Record, i: usize| record.get(i).copied().unwrap_or(0.0);

        let position = &self.positions[corner.position.get() - 1];
        self.mesh
            .position
            .extend((0..3).map(|i| component(position, i)));

        match corner.texcoord {
            Some(index) => {
                let texcoord = &self.texcoords[index.get() - 1];
                self.mesh
                    .texcoord
                    .extend((0..2).map(|i| component(texcoord, i)));
            }
            None => self.mesh.texcoord.extend([0.0, 0.0]),
        }

        match corner.normal {
            Some(index) => {
                let normal = &self.normals[index.get() - 1];
                self.mesh.normal.extend((0..3).map(|i| component(normal, i)));
            }
            None => self.mesh.normal.extend([0.0, 0.0, 0.0]),
        }
    }
}
