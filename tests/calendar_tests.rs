mod common;

use common::{fifth, twentieth};
use quincena_core::{
    calendar::{self, PayDay, PeriodMarker},
    plan::{GoalWindow, OneTimeGoal},
};

#[test]
fn a_year_has_twenty_four_quincenas() {
    let dates = calendar::sequence(fifth(0), 24);
    assert_eq!(dates.len(), 24);
    assert_eq!(dates.last().copied(), Some(twentieth(11)));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(
        dates.iter().filter(|date| date.day == PayDay::Fifth).count(),
        12
    );
}

#[test]
fn month_names_are_spanish_abbreviations() {
    let names: Vec<&str> = (0..12).map(calendar::month_name).collect();
    assert_eq!(
        names,
        vec!["Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic"]
    );
    assert_eq!(calendar::month_name(12), "");
}

#[test]
fn goal_windows_are_inclusive() {
    let window = GoalWindow::new(fifth(0), fifth(1));
    assert!(window.contains(fifth(0)));
    assert!(window.contains(twentieth(0)));
    assert!(window.contains(fifth(1)));
    assert!(!window.contains(twentieth(1)));

    let goal = OneTimeGoal::new("g", "Meta", 100).within(window);
    assert!(goal.is_active_on(fifth(1)));
    assert!(!goal.is_active_on(PeriodMarker::new(PayDay::Twentieth, 11, 2025).expect("marker")));
}

#[test]
fn a_goal_without_window_is_always_active() {
    let goal = OneTimeGoal::new("g", "Meta", 100);
    assert!(goal.is_active_on(fifth(0)));
    assert!(goal.is_active_on(twentieth(11)));
}
