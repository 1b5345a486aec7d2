//! Name and comment index over a decoded descriptor image
//!
//! The walker navigates descriptors by fully-qualified type name (field
//! `type_name` references) and by file path (provider discovery). Both
//! lookups, plus the `SourceCodeInfo` comment table, are materialized here
//! once per run.

use std::collections::HashMap;
use std::path::Path;

use prost::Message;

use crate::descriptor::proto::{
    DescriptorProto, EnumDescriptorProto, FileDescriptorProto, FileDescriptorSet,
};
use crate::error::{CodegenError, Result};

/// Location of a message type inside the descriptor set: file index plus the
/// `SourceCodeInfo` path (`[4, i]` for top-level messages, extended with
/// `[3, j]` per nesting level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLoc {
    pub file: usize,
    pub path: Vec<i32>,
}

impl TypeLoc {
    /// Comment path of the field at `index` within this message.
    pub fn field_path(&self, index: usize) -> Vec<i32> {
        let mut path = self.path.clone();
        path.push(2);
        path.push(index as i32);
        path
    }
}

/// Decoded descriptor image with name lookups and comment tables.
pub struct DescriptorIndex {
    set: FileDescriptorSet,
    files_by_name: HashMap<String, usize>,
    messages: HashMap<String, TypeLoc>,
    /// Enum name -> (file index, enum index within the file).
    ///
    /// Nested enums are indexed by fully-qualified name as well, but located
    /// through their parent message during lookup.
    enums: HashMap<String, EnumLoc>,
    comments: HashMap<(usize, Vec<i32>), String>,
}

#[derive(Debug, Clone)]
enum EnumLoc {
    TopLevel { file: usize, index: usize },
    Nested { message: TypeLoc, index: usize },
}

impl DescriptorIndex {
    /// Read and decode a descriptor image from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CodegenError::descriptor(format!(
                "cannot read descriptor image {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decode a descriptor image from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes)?;
        Ok(Self::from_set(set))
    }

    /// Build the index over an already-decoded set.
    pub fn from_set(set: FileDescriptorSet) -> Self {
        let mut index = Self {
            set,
            files_by_name: HashMap::new(),
            messages: HashMap::new(),
            enums: HashMap::new(),
            comments: HashMap::new(),
        };

        for file_idx in 0..index.set.file.len() {
            let file = &index.set.file[file_idx];
            index
                .files_by_name
                .insert(file.name().to_string(), file_idx);

            let package = file.package().to_string();
            let mut messages = Vec::new();
            let mut enums = Vec::new();

            for (i, msg) in file.message_type.iter().enumerate() {
                collect_message(
                    msg,
                    &package,
                    TypeLoc {
                        file: file_idx,
                        path: vec![4, i as i32],
                    },
                    &mut messages,
                    &mut enums,
                );
            }
            for (i, en) in file.enum_type.iter().enumerate() {
                enums.push((
                    qualified(&package, en.name()),
                    EnumLoc::TopLevel {
                        file: file_idx,
                        index: i,
                    },
                ));
            }

            if let Some(info) = &file.source_code_info {
                for loc in &info.location {
                    let comment = loc
                        .leading_comments
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or("");
                    if !comment.is_empty() {
                        index
                            .comments
                            .insert((file_idx, loc.path.clone()), comment.to_string());
                    }
                }
            }

            for (fqn, loc) in messages {
                index.messages.insert(fqn, loc);
            }
            for (fqn, loc) in enums {
                index.enums.insert(fqn, loc);
            }
        }

        index
    }

    /// All files in the image, in image order.
    pub fn files(&self) -> &[FileDescriptorProto] {
        &self.set.file
    }

    pub fn file(&self, idx: usize) -> &FileDescriptorProto {
        &self.set.file[idx]
    }

    /// Look up a file by its in-image path.
    pub fn file_by_name(&self, name: &str) -> Option<(usize, &FileDescriptorProto)> {
        let idx = *self.files_by_name.get(name)?;
        Some((idx, &self.set.file[idx]))
    }

    /// Resolve a message location back to its descriptor.
    pub fn message(&self, loc: &TypeLoc) -> &DescriptorProto {
        let file = &self.set.file[loc.file];
        let mut msg = &file.message_type[loc.path[1] as usize];
        let mut i = 2;
        while i + 1 < loc.path.len() {
            msg = &msg.nested_type[loc.path[i + 1] as usize];
            i += 2;
        }
        msg
    }

    /// Resolve a fully-qualified message name (no leading dot).
    pub fn resolve_message(&self, fqn: &str) -> Option<(&DescriptorProto, TypeLoc)> {
        let loc = self.messages.get(fqn)?.clone();
        Some((self.message(&loc), loc))
    }

    /// Resolve a fully-qualified enum name, returning the enum descriptor and
    /// the package of the file declaring it.
    pub fn resolve_enum(&self, fqn: &str) -> Option<(&EnumDescriptorProto, &str)> {
        match self.enums.get(fqn)? {
            EnumLoc::TopLevel { file, index } => {
                let fd = &self.set.file[*file];
                Some((&fd.enum_type[*index], fd.package()))
            }
            EnumLoc::Nested { message, index } => {
                let msg = self.message(message);
                Some((&msg.enum_type[*index], self.set.file[message.file].package()))
            }
        }
    }

    /// Leading comment at a `SourceCodeInfo` path, or empty.
    pub fn leading_comment(&self, file: usize, path: &[i32]) -> &str {
        self.comments
            .get(&(file, path.to_vec()))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn qualified(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn collect_message(
    msg: &DescriptorProto,
    scope: &str,
    loc: TypeLoc,
    messages: &mut Vec<(String, TypeLoc)>,
    enums: &mut Vec<(String, EnumLoc)>,
) {
    let fqn = qualified(scope, msg.name());

    for (i, en) in msg.enum_type.iter().enumerate() {
        enums.push((
            qualified(&fqn, en.name()),
            EnumLoc::Nested {
                message: loc.clone(),
                index: i,
            },
        ));
    }

    for (i, nested) in msg.nested_type.iter().enumerate() {
        let mut nested_path = loc.path.clone();
        nested_path.push(3);
        nested_path.push(i as i32);
        collect_message(
            nested,
            &fqn,
            TypeLoc {
                file: loc.file,
                path: nested_path,
            },
            messages,
            enums,
        );
    }

    messages.push((fqn, loc));
}
