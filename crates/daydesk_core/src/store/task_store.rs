//! Task-specific store operations (completion toggling and bulk actions).

use crate::model::task::Task;
use crate::store::backend::StorageBackend;
use crate::store::record_store::{RecordStore, StoreResult};
use chrono::{DateTime, Utc};

/// Record store over tasks.
pub type TaskStore<B> = RecordStore<Task, B>;

impl<B: StorageBackend> RecordStore<Task, B> {
    /// Flips completion of the task with `id` and persists.
    ///
    /// Returns the new completion state.
    pub fn toggle_complete(&mut self, id: &str) -> StoreResult<bool> {
        self.toggle_complete_at(id, Utc::now())
    }

    pub fn toggle_complete_at(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        let task = self.find_mut(id)?;
        task.toggle_complete(now);
        let completed = task.completed;
        self.persist("toggle_complete")?;
        Ok(completed)
    }

    /// Completes every pending task in one persisted batch.
    ///
    /// Returns how many tasks changed; nothing is written when zero.
    pub fn complete_all(&mut self) -> StoreResult<usize> {
        self.complete_all_at(Utc::now())
    }

    pub fn complete_all_at(&mut self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut changed = 0;
        for task in self.records_mut().iter_mut().filter(|task| !task.completed) {
            task.mark_complete(now);
            changed += 1;
        }
        if changed > 0 {
            self.persist("complete_all")?;
        }
        Ok(changed)
    }

    /// Removes every completed task in one persisted batch.
    ///
    /// Returns how many tasks were removed; nothing is written when zero.
    pub fn clear_completed(&mut self) -> StoreResult<usize> {
        let records = self.records_mut();
        let before = records.len();
        records.retain(|task| !task.completed);
        let removed = before - records.len();
        if removed > 0 {
            self.persist("clear_completed")?;
        }
        Ok(removed)
    }

    pub fn pending_count(&self) -> usize {
        self.records().iter().filter(|task| !task.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.len() - self.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::task::Task;
    use crate::model::ValidationError;
    use crate::store::backend::MemoryBackend;
    use crate::store::record_store::StoreError;
    use chrono::Utc;

    fn store_with(titles: &[&str]) -> TaskStore<MemoryBackend> {
        let mut store = TaskStore::empty(MemoryBackend::new());
        for title in titles {
            store.add(Task::new(*title)).unwrap();
        }
        store
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut store = store_with(&["hem"]);
        let id = store.records()[0].id.clone();

        assert!(store.toggle_complete(&id).unwrap());
        let task = store.get(&id).unwrap();
        assert!(task.completed && task.completed_at.is_some());

        assert!(!store.toggle_complete(&id).unwrap());
        let task = store.get(&id).unwrap();
        assert!(!task.completed && task.completed_at.is_none());
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let mut store = store_with(&["a"]);
        assert!(matches!(
            store.toggle_complete("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn bulk_actions_report_affected_counts() {
        let mut store = store_with(&["a", "b", "c"]);
        let first = store.records()[0].id.clone();
        store.toggle_complete(&first).unwrap();

        assert_eq!(store.complete_all().unwrap(), 2);
        assert_eq!(store.complete_all().unwrap(), 0);
        assert_eq!(store.completed_count(), 3);

        assert_eq!(store.clear_completed().unwrap(), 3);
        assert!(store.is_empty());
        assert_eq!(store.clear_completed().unwrap(), 0);
    }

    #[test]
    fn add_rejects_completion_flag_without_timestamp() {
        let mut store = store_with(&[]);

        let mut completed = Task::new("cut pattern");
        completed.completed = true;
        assert!(matches!(
            store.add(completed),
            Err(StoreError::Validation(ValidationError::CompletionMismatch))
        ));

        let mut stamped = Task::new("press seams");
        stamped.completed_at = Some(Utc::now());
        assert!(matches!(
            store.add(stamped),
            Err(StoreError::Validation(ValidationError::CompletionMismatch))
        ));
        assert!(store.is_empty());

        let mut done = Task::new("sew buttons");
        done.mark_complete(Utc::now());
        store.add(done).unwrap();
        assert_eq!(store.completed_count(), 1);
    }
}
