//! The monthly calendar view: incomplete tasks bucketed by due date
//!
//! Like the [`stats`](crate::stats) module, this is a pure computation: the grid is
//! rebuilt from the task list whenever it changes or the displayed month moves.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::task::Task;

/// One day of the displayed month
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    /// The day of the month, 1-based
    pub day: u32,
    pub date: NaiveDate,
    /// The incomplete tasks due on this calendar day, in input order
    pub tasks: Vec<Task>,
    pub is_today: bool,
}

/// A week row. Cells before day 1 and after the last day of the month are `None`.
pub type WeekRow = [Option<DayCell>; 7];

/// The grid for one displayed month: four to six rows of seven cells each.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    year: i32,
    /// 1-based month number
    month: u32,
    weeks: Vec<WeekRow>,
}

impl MonthGrid {
    /// Build the grid for `(year, month)`.
    ///
    /// Only tasks that are incomplete *and* have a due date are placed; the bucketing key
    /// is the due date truncated to its UTC calendar day. `today` decides which cell (if
    /// any) is flagged: when the displayed month is not the current one, no cell is.
    pub fn build(tasks: &[Task], year: i32, month: u32, today: NaiveDate) -> Self {
        let mut tasks_by_date: HashMap<NaiveDate, Vec<Task>> = HashMap::new();
        for task in tasks {
            if task.completed() {
                continue;
            }
            if let Some(due_date) = task.due_date() {
                tasks_by_date
                    .entry(due_date.date_naive())
                    .or_insert_with(Vec::new)
                    .push(task.clone());
            }
        }

        let days_in_month = days_in_month(year, month);
        let leading_blanks = first_weekday_of_month(year, month);

        let mut weeks = Vec::new();
        let mut day = 1;
        // At most 6 rows: 31 days shifted by up to 6 leading blanks
        for row in 0..6 {
            let mut week: WeekRow = Default::default();
            for column in 0..7 {
                if (row == 0 && column < leading_blanks) || day > days_in_month {
                    continue;
                }
                // `day` never exceeds the number of days in the month here
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    week[column] = Some(DayCell {
                        day,
                        date,
                        tasks: tasks_by_date.remove(&date).unwrap_or_default(),
                        is_today: date == today,
                    });
                }
                day += 1;
            }
            weeks.push(week);
            if day > days_in_month {
                break;
            }
        }

        Self { year, month, weeks }
    }

    pub fn year(&self) -> i32 { self.year }
    pub fn month(&self) -> u32 { self.month }

    /// The week rows, top to bottom. Every row has exactly 7 cells.
    pub fn weeks(&self) -> &[WeekRow] {
        &self.weeks
    }

    /// Every non-empty cell, in calendar order
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().filter_map(|cell| cell.as_ref())
    }
}

/// The number of days in a month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last_day| last_day.day())
        .unwrap_or(31)
}

/// The column (0 = Sunday) of the first day of the month
fn first_weekday_of_month(year: i32, month: u32) -> usize {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.weekday().num_days_from_sunday() as usize)
        .unwrap_or(0)
}

/// The month before `(year, month)`, for "previous" navigation
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// The month after `(year, month)`, for "next" navigation
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    use crate::task::{CompletionStatus, Priority, Reminder, Task, TaskId};

    fn task_due(id: &str, due_date: Option<DateTime<Utc>>, completed: bool) -> Task {
        let completion_status = if completed {
            CompletionStatus::Completed(Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()))
        } else {
            CompletionStatus::Uncompleted
        };
        Task::new_with_parameters(
            TaskId::from(id),
            format!("task {}", id),
            completion_status,
            due_date,
            Priority::Medium,
            None,
            Reminder::default(),
        )
    }

    fn far_away_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()
    }

    #[test]
    fn every_row_has_seven_cells_and_days_are_all_placed() {
        for &(year, month) in &[(2024, 2), (2023, 2), (2024, 3), (2024, 12), (2025, 6)] {
            let grid = MonthGrid::build(&[], year, month, far_away_today());

            // WeekRow is a fixed-size array, so the width is structural; check the
            // row count and the day coverage instead
            assert!(grid.weeks().len() >= 4 && grid.weeks().len() <= 6);
            let days: Vec<u32> = grid.cells().map(|cell| cell.day).collect();
            let expected: Vec<u32> = (1..=days_in_month(year, month)).collect();
            assert_eq!(days, expected, "bad grid for {}-{}", year, month);
        }
    }

    #[test]
    fn leading_cells_are_padding() {
        // June 2024 starts on a Saturday: six leading blanks
        let grid = MonthGrid::build(&[], 2024, 6, far_away_today());
        let first_row = &grid.weeks()[0];
        for column in 0..6 {
            assert!(first_row[column].is_none());
        }
        assert_eq!(first_row[6].as_ref().unwrap().day, 1);

        // September 2024 starts on a Sunday: no leading blank
        let grid = MonthGrid::build(&[], 2024, 9, far_away_today());
        assert_eq!(grid.weeks()[0][0].as_ref().unwrap().day, 1);
    }

    #[test]
    fn no_trailing_all_empty_row() {
        // February 2026 has 28 days and starts on a Sunday: exactly 4 full rows
        let grid = MonthGrid::build(&[], 2026, 2, far_away_today());
        assert_eq!(grid.weeks().len(), 4);
        assert!(grid.weeks().last().unwrap().iter().all(|cell| cell.is_some()));
    }

    #[test]
    fn only_incomplete_tasks_with_a_due_date_are_placed() {
        let due = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let tasks = vec![
            task_due("pending", Some(due), false),
            task_due("done", Some(due), true),
            task_due("no-due-date", None, false),
        ];
        let grid = MonthGrid::build(&tasks, 2024, 3, far_away_today());

        let cell = grid.cells().find(|cell| cell.day == 15).unwrap();
        let placed: Vec<&str> = cell.tasks.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(placed, vec!["pending"]);

        let total_placed: usize = grid.cells().map(|cell| cell.tasks.len()).sum();
        assert_eq!(total_placed, 1);
    }

    #[test]
    fn bucketing_ignores_the_time_of_day() {
        let tasks = vec![
            task_due("early", Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 5, 0).unwrap()), false),
            task_due("late", Some(Utc.with_ymd_and_hms(2024, 3, 15, 23, 55, 0).unwrap()), false),
        ];
        let grid = MonthGrid::build(&tasks, 2024, 3, far_away_today());
        let cell = grid.cells().find(|cell| cell.day == 15).unwrap();
        assert_eq!(cell.tasks.len(), 2);
    }

    #[test]
    fn exactly_one_cell_is_today_in_the_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let grid = MonthGrid::build(&[], 2024, 3, today);
        let today_cells: Vec<&DayCell> = grid.cells().filter(|cell| cell.is_today).collect();
        assert_eq!(today_cells.len(), 1);
        assert_eq!(today_cells[0].day, 15);
    }

    #[test]
    fn no_cell_is_today_when_displaying_another_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        // Same day number, previous month
        let grid = MonthGrid::build(&[], 2024, 2, today);
        assert_eq!(grid.cells().filter(|cell| cell.is_today).count(), 0);
        // Same month, previous year
        let grid = MonthGrid::build(&[], 2023, 3, today);
        assert_eq!(grid.cells().filter(|cell| cell.is_today).count(), 0);
    }

    #[test]
    fn month_navigation_wraps_across_years() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 7), (2024, 6));
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(next_month(2024, 7), (2024, 8));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }
}
