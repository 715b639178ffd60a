//! Demo 01: Dashboard Session
//!
//! Walks through one dashboard session: seed, create, toggle, edit, delete,
//! then filter, search and stats, with every change mirrored to SQLite.
//!
//! Run with: cargo run --example 01_dashboard

use eyre::Result;
use taskboard::{Board, NewTask, SqliteBackend, StatusFilter, TaskStatus, TaskUpdate};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    println!("Taskboard Dashboard Demo");
    println!("========================\n");

    let mut board = Board::open(SqliteBackend::open(temp_dir.path())?, true)?;
    println!("Seeded board: {:?}\n", board.stats());

    println!("1. CREATE");
    let task = board.create(
        NewTask::new("Prepare sprint demo")
            .with_description("Slides and a short walkthrough")
            .with_due_date("2024-02-10"),
    )?;
    println!("   Created {} ({})\n", task.title, task.id);

    println!("2. SET STATUS");
    board.set_status("2", TaskStatus::Completed)?;
    println!("   Stats now: {:?}\n", board.stats());

    println!("3. UPDATE");
    board.update("4", TaskUpdate::default().due_date(None))?;
    println!("   Task 4 due date cleared\n");

    println!("4. DELETE");
    let removed = board.delete("3")?;
    println!("   Removed {}\n", removed.title);

    println!("5. VIEW pending + \"bug\"");
    for task in board.view(StatusFilter::Pending, "bug") {
        println!("   - {} [{}]", task.title, task.status);
    }

    println!("\n6. STATS");
    let stats = board.stats();
    println!(
        "   total={} pending={} completed={} completion={}%",
        stats.total, stats.pending, stats.completed, stats.completion_rate
    );

    println!("\n7. REOPEN from disk");
    let reopened = Board::open(SqliteBackend::open(temp_dir.path())?, true)?;
    println!("   {} tasks restored, first is '{}'", reopened.store().len(), reopened.store().tasks()[0].title);

    Ok(())
}
