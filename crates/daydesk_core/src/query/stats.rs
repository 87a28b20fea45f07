//! Task counters over the full collection (not the filtered view).

use crate::model::task::Task;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// `completed / total` as a rounded percentage; 0 for an empty list.
    pub completion_percent: u8,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        let overdue = tasks.iter().filter(|task| task.is_overdue(today)).count();

        Self {
            total,
            completed,
            pending: total - completed,
            overdue,
            completion_percent: completion_percent(completed, total),
        }
    }
}

fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Round half up: floor(completed * 100 / total + 0.5).
    let percent = (completed * 200 + total) / (2 * total);
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::{completion_percent, TaskStats};
    use crate::model::task::Task;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(1, 8), 13);
        assert_eq!(completion_percent(4, 4), 100);
    }

    #[test]
    fn counts_cover_whole_collection() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut late = Task::new("late");
        late.due_date = today.pred_opt();
        let mut done = Task::new("done");
        done.mark_complete(Utc::now());
        let tasks = vec![late, done, Task::new("open")];

        let stats = TaskStats::compute(&tasks, today);
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                completed: 1,
                pending: 2,
                overdue: 1,
                completion_percent: 33,
            }
        );
    }
}
