#![forbid(unsafe_code)]

//! Patchboard showcase: a console "UI" over the project-editor model.
//!
//! Each pretend widget is a read binding whose invalidation callback sets a
//! dirty flag; the main loop redraws dirty widgets by pulling fresh values.
//! Run with `RUST_LOG=patchboard_core=trace` to watch the hub work.

mod model;

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;
use tracing_subscriber::EnvFilter;

use patchboard_bind::{AsyncWriteBinding, ReadBinding, WriteBinding};
use patchboard_core::{Hub, Subject};

use model::{
    Project, Settings, append_notes, current_theme, import_notes, project_summary,
    rename_project, set_theme,
};

fn dirty_flag() -> (Rc<Cell<bool>>, impl Fn() + 'static) {
    let flag = Rc::new(Cell::new(false));
    let flag_in = Rc::clone(&flag);
    (flag, move || flag_in.set(true))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hub = Hub::new();
    let alpha = Project::shared("Alpha");
    let beta = Project::shared("Beta");
    let settings = Settings::shared("light");
    tracing::info!(
        alpha = alpha.borrow().subject_id().raw(),
        beta = beta.borrow().subject_id().raw(),
        "model wired"
    );

    let (summary_dirty, on_summary) = dirty_flag();
    let mut summary =
        ReadBinding::bind(&hub, Rc::clone(&alpha), project_summary(), on_summary);

    let (theme_dirty, on_theme) = dirty_flag();
    let theme = ReadBinding::bind(&hub, Rc::clone(&settings), current_theme(), on_theme);

    let rename = WriteBinding::bind(&hub, Rc::clone(&alpha), rename_project());
    let notes = WriteBinding::bind(&hub, Rc::clone(&alpha), append_notes());
    let import = AsyncWriteBinding::bind(&hub, Rc::clone(&alpha), import_notes());
    let theme_switch = WriteBinding::bind(&hub, Rc::clone(&settings), set_theme());

    println!("[summary] {}", summary.get());
    println!("[theme]   {}", theme.get());

    rename.mutate("Alpha II".into()).expect("rename succeeds");
    if summary_dirty.replace(false) {
        println!("[summary] {}", summary.get());
    }

    match rename.mutate("   ".into()) {
        Ok(()) => unreachable!("blank names are rejected"),
        Err(err) => println!("[error]   {err}"),
    }
    assert!(!summary_dirty.get(), "failed mutation must not invalidate");

    notes.mutate("First entry.\n".into()).expect("notes fit");
    if summary_dirty.replace(false) {
        println!("[summary] {}", summary.get());
    }

    let imported = block_on(import.mutate("Imported changelog.\n".into()))
        .expect("import succeeds");
    println!("[import]  {imported} bytes");
    if summary_dirty.replace(false) {
        println!("[summary] {}", summary.get());
    }

    theme_switch.mutate("dark".into()).expect("theme applies");
    if theme_dirty.replace(false) {
        println!("[theme]   {}", theme.get());
    }

    // Switch the header widget over to the other project; the stale
    // registration is torn down before the new one is made.
    summary.rebind(Rc::clone(&beta), project_summary());
    println!("[summary] {}", summary.get());

    let retired = alpha.borrow().subject_id();
    hub.retire_subject(retired);
    println!("[hub]     {hub:?}");
}
