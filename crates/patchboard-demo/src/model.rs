#![forbid(unsafe_code)]

//! Demo domain: a project-editor model wired for invalidation.
//!
//! The engine knows nothing about these types; they register what they
//! expose (accessors with deps) and what they change (mutators with
//! triggers), and the bindings do the rest.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use patchboard_bind::{Accessor, AsyncMutator, Mutator, getter, setter, setter_async};
use patchboard_core::{Key, Subject, SubjectId, SubjectTag};

pub const PROJECT_NAME: Key = Key::from_static("Project.name");
pub const PROJECT_NOTES: Key = Key::from_static("Project.notes");
pub const SETTINGS_THEME: Key = Key::from_static("*Settings.theme");

const MAX_NOTES_BYTES: usize = 4096;

pub type Result<T> = std::result::Result<T, ProjectError>;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("notes would exceed {max} bytes (got {len})")]
    NotesTooLong { len: usize, max: usize },

    #[error("import source is empty")]
    EmptyImport,
}

/// One open project. Identity-tagged so bindings can scope to it.
pub struct Project {
    tag: SubjectTag,
    pub name: String,
    pub notes: String,
}

impl Project {
    #[must_use]
    pub fn shared(name: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            tag: SubjectTag::new(),
            name: name.into(),
            notes: String::new(),
        }))
    }
}

impl Subject for Project {
    fn subject_id(&self) -> SubjectId {
        self.tag.id()
    }
}

/// Application-wide settings. Observed through a global key, so theme
/// changes reach every consumer no matter which subject they bound.
pub struct Settings {
    tag: SubjectTag,
    pub theme: String,
}

impl Settings {
    #[must_use]
    pub fn shared(theme: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            tag: SubjectTag::new(),
            theme: theme.into(),
        }))
    }
}

impl Subject for Settings {
    fn subject_id(&self) -> SubjectId {
        self.tag.id()
    }
}

/// One-line summary shown in the demo's pretend header widget.
#[must_use]
pub fn project_summary() -> Accessor<Project, String> {
    getter([PROJECT_NAME, PROJECT_NOTES], |p: &Project| {
        format!("{} ({} bytes of notes)", p.name, p.notes.len())
    })
}

#[must_use]
pub fn current_theme() -> Accessor<Settings, String> {
    getter([SETTINGS_THEME], |s: &Settings| s.theme.clone())
}

#[must_use]
pub fn rename_project() -> Mutator<Project, String, (), ProjectError> {
    setter([PROJECT_NAME], |p: &mut Project, name: String| {
        if name.trim().is_empty() {
            return Err(ProjectError::EmptyName);
        }
        p.name = name;
        Ok(())
    })
}

#[must_use]
pub fn append_notes() -> Mutator<Project, String, usize, ProjectError> {
    setter([PROJECT_NOTES], |p: &mut Project, extra: String| {
        let len = p.notes.len() + extra.len();
        if len > MAX_NOTES_BYTES {
            return Err(ProjectError::NotesTooLong {
                len,
                max: MAX_NOTES_BYTES,
            });
        }
        p.notes.push_str(&extra);
        Ok(p.notes.len())
    })
}

/// Pretend-async notes import; returns the number of bytes imported.
#[must_use]
pub fn import_notes() -> AsyncMutator<Project, String, usize, ProjectError> {
    setter_async(
        [PROJECT_NOTES],
        |project: Rc<RefCell<Project>>, source: String| async move {
            if source.is_empty() {
                return Err(ProjectError::EmptyImport);
            }
            let mut project = project.borrow_mut();
            project.notes.push_str(&source);
            Ok(source.len())
        },
    )
}

#[must_use]
pub fn set_theme() -> Mutator<Settings, String, (), ProjectError> {
    setter([SETTINGS_THEME], |s: &mut Settings, theme: String| {
        s.theme = theme;
        Ok(())
    })
}
