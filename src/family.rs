use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::journal::SheetRef;
use crate::models::{
    cell, CareRecord, Category, CategoryStat, Child, ChildPatch, NewChild, NewRecord, NewReminder,
    Reminder, ReminderPatch, Statistics,
};
use crate::sheets::SheetStore;
use crate::validation::require_field;

/// Resolved worksheets of the reminder board.
#[derive(Debug, Clone)]
pub struct FamilySheets {
    pub children: SheetRef,
    pub reminders: SheetRef,
    pub records: SheetRef,
    pub categories: SheetRef,
}

/// Repository for the child-care side: children, reminders, completion
/// records, categories and statistics. These sheets are small and rarely
/// contended, so reads are uncached and writes go straight through.
pub struct FamilyBoard<S> {
    store: Arc<S>,
    sheets: FamilySheets,
}

impl<S: SheetStore> FamilyBoard<S> {
    pub fn new(store: Arc<S>, sheets: FamilySheets) -> Self {
        Self { store, sheets }
    }

    fn children_range(&self) -> String {
        format!("{}!A:H", self.sheets.children.title)
    }

    fn reminders_range(&self) -> String {
        format!("{}!A:L", self.sheets.reminders.title)
    }

    fn records_range(&self) -> String {
        format!("{}!A:I", self.sheets.records.title)
    }

    fn categories_range(&self) -> String {
        format!("{}!A:G", self.sheets.categories.title)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let rows = self.store.get_values(&self.categories_range()).await?;
        Ok(data_rows(&rows)
            .iter()
            .map(|row| Category {
                id: cell(row, 0),
                name: cell(row, 1),
                icon: cell(row, 2),
                color: cell(row, 3),
                order: cell(row, 4).parse().unwrap_or(0),
                description: cell(row, 5),
                created_at: cell(row, 6),
            })
            .collect())
    }

    pub async fn children(&self) -> Result<Vec<Child>> {
        let rows = self.store.get_values(&self.children_range()).await?;
        Ok(data_rows(&rows).iter().map(|row| child_from_row(row)).collect())
    }

    pub async fn add_child(&self, new: NewChild) -> Result<Child> {
        let name = new.name.unwrap_or_default();
        let age = new.age.unwrap_or_default();
        require_field("name", &name).map_err(AppError::from)?;
        require_field("age", &age).map_err(AppError::from)?;

        let now = Utc::now().to_rfc3339();
        let child = Child {
            id: Uuid::new_v4().to_string(),
            name,
            age,
            birthday: new.birthday.unwrap_or_default(),
            avatar: new.avatar.unwrap_or_default(),
            created_at: now.clone(),
            updated_at: now,
            status: "active".to_string(),
        };

        self.store
            .append_row(
                &self.children_range(),
                vec![
                    child.id.clone(),
                    child.name.clone(),
                    child.age.clone(),
                    child.birthday.clone(),
                    child.avatar.clone(),
                    child.created_at.clone(),
                    child.updated_at.clone(),
                    child.status.clone(),
                ],
            )
            .await?;

        tracing::info!("added child {}", child.id);
        Ok(child)
    }

    pub async fn update_child(&self, id: &str, patch: ChildPatch) -> Result<()> {
        let rows = self.store.get_values(&self.children_range()).await?;
        let row_index = find_by_id(&rows, id)
            .ok_or_else(|| AppError::NotFound("Child".to_string()))?;

        let mut row = padded(&rows[row_index], 8);
        if let Some(name) = patch.name.filter(|v| !v.is_empty()) {
            row[1] = name;
        }
        if let Some(age) = patch.age.filter(|v| !v.is_empty()) {
            row[2] = age;
        }
        if let Some(birthday) = patch.birthday {
            row[3] = birthday;
        }
        if let Some(avatar) = patch.avatar {
            row[4] = avatar;
        }
        row[6] = Utc::now().to_rfc3339();

        self.store
            .update_values(
                &format!(
                    "{}!A{}:H{}",
                    self.sheets.children.title,
                    row_index + 1,
                    row_index + 1
                ),
                vec![row],
            )
            .await
    }

    pub async fn reminders(
        &self,
        child_id: Option<&str>,
        date: Option<&str>,
    ) -> Result<Vec<Reminder>> {
        let rows = self.store.get_values(&self.reminders_range()).await?;
        let mut reminders: Vec<Reminder> =
            data_rows(&rows).iter().map(|row| reminder_from_row(row)).collect();

        if let Some(child_id) = child_id {
            reminders.retain(|r| r.child_id == child_id);
        }
        if let Some(date) = date {
            if let Some(target) = parse_day(date) {
                reminders.retain(|r| reminder_falls_on(r, target));
            }
        }

        Ok(reminders)
    }

    pub async fn add_reminder(&self, new: NewReminder) -> Result<Reminder> {
        let child_id = new.child_id.unwrap_or_default();
        let title = new.title.unwrap_or_default();
        let reminder_type = new.reminder_type.unwrap_or_default();
        let reminder_time = new.reminder_time.unwrap_or_default();
        require_field("childId", &child_id).map_err(AppError::from)?;
        require_field("title", &title).map_err(AppError::from)?;
        require_field("reminderType", &reminder_type).map_err(AppError::from)?;
        require_field("reminderTime", &reminder_time).map_err(AppError::from)?;

        let now = Utc::now().to_rfc3339();
        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            child_id,
            title,
            description: new.description.unwrap_or_default(),
            category: new.category.unwrap_or_default(),
            reminder_type,
            reminder_time,
            repeat_rule: new.repeat_rule.unwrap_or_default(),
            advance_minutes: new.advance_minutes.unwrap_or(0),
            enabled: true,
            created_at: now.clone(),
            updated_at: now,
        };

        self.store
            .append_row(&self.reminders_range(), reminder_to_row(&reminder))
            .await?;

        tracing::info!("added reminder {} for child {}", reminder.id, reminder.child_id);
        Ok(reminder)
    }

    pub async fn update_reminder(&self, id: &str, patch: ReminderPatch) -> Result<()> {
        let rows = self.store.get_values(&self.reminders_range()).await?;
        let row_index = find_by_id(&rows, id)
            .ok_or_else(|| AppError::NotFound("Reminder".to_string()))?;

        let mut row = padded(&rows[row_index], 12);
        if let Some(title) = patch.title {
            row[2] = title;
        }
        if let Some(description) = patch.description {
            row[3] = description;
        }
        if let Some(category) = patch.category {
            row[4] = category;
        }
        if let Some(reminder_type) = patch.reminder_type {
            row[5] = reminder_type;
        }
        if let Some(reminder_time) = patch.reminder_time {
            row[6] = reminder_time;
        }
        if let Some(repeat_rule) = patch.repeat_rule {
            row[7] = repeat_rule;
        }
        if let Some(advance_minutes) = patch.advance_minutes {
            row[8] = advance_minutes.to_string();
        }
        if let Some(enabled) = patch.enabled {
            row[9] = enabled.to_string();
        }
        row[11] = Utc::now().to_rfc3339();

        self.store
            .update_values(
                &format!(
                    "{}!A{}:L{}",
                    self.sheets.reminders.title,
                    row_index + 1,
                    row_index + 1
                ),
                vec![row],
            )
            .await
    }

    pub async fn delete_reminder(&self, id: &str) -> Result<()> {
        let rows = self.store.get_values(&self.reminders_range()).await?;
        let row_index = find_by_id(&rows, id)
            .ok_or_else(|| AppError::NotFound("Reminder".to_string()))?;

        // physical array index doubles as the 0-based structural index
        self.store
            .delete_row(self.sheets.reminders.sheet_id, row_index as i64)
            .await
    }

    pub async fn add_record(&self, new: NewRecord) -> Result<CareRecord> {
        let reminder_id = new.reminder_id.unwrap_or_default();
        let child_id = new.child_id.unwrap_or_default();
        let scheduled_time = new.scheduled_time.unwrap_or_default();
        require_field("reminderId", &reminder_id).map_err(AppError::from)?;
        require_field("childId", &child_id).map_err(AppError::from)?;
        require_field("scheduledTime", &scheduled_time).map_err(AppError::from)?;

        let status = new.status.unwrap_or_default();
        let record = CareRecord {
            id: Uuid::new_v4().to_string(),
            reminder_id,
            child_id,
            scheduled_time,
            completed_time: if status == "completed" {
                Utc::now().to_rfc3339()
            } else {
                String::new()
            },
            status,
            note: new.note.unwrap_or_default(),
            operator: "User".to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        self.store
            .append_row(
                &self.records_range(),
                vec![
                    record.id.clone(),
                    record.reminder_id.clone(),
                    record.child_id.clone(),
                    record.scheduled_time.clone(),
                    record.completed_time.clone(),
                    record.status.clone(),
                    record.note.clone(),
                    record.operator.clone(),
                    record.created_at.clone(),
                ],
            )
            .await?;

        Ok(record)
    }

    pub async fn records(
        &self,
        child_id: Option<&str>,
        reminder_id: Option<&str>,
        date: Option<&str>,
    ) -> Result<Vec<CareRecord>> {
        let rows = self.store.get_values(&self.records_range()).await?;
        let mut records: Vec<CareRecord> =
            data_rows(&rows).iter().map(|row| record_from_row(row)).collect();

        if let Some(child_id) = child_id {
            records.retain(|r| r.child_id == child_id);
        }
        if let Some(reminder_id) = reminder_id {
            records.retain(|r| r.reminder_id == reminder_id);
        }
        if let Some(date) = date {
            if let Some(target) = parse_day(date) {
                records.retain(|r| parse_day(&r.scheduled_time) == Some(target));
            }
        }

        Ok(records)
    }

    /// Completion statistics over the record sheet, joined with the
    /// reminder sheet for the per-category breakdown.
    pub async fn statistics(
        &self,
        child_id: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Statistics> {
        let mut records = self.records(child_id, None, None).await?;

        if let (Some(start), Some(end)) = (
            start_date.and_then(parse_day),
            end_date.and_then(parse_day),
        ) {
            records.retain(|r| match parse_day(&r.scheduled_time) {
                Some(day) => day >= start && day <= end,
                None => false,
            });
        }

        let total_tasks = records.len();
        let completed_tasks = records.iter().filter(|r| r.status == "completed").count();
        let skipped_tasks = records.iter().filter(|r| r.status == "skipped").count();
        let pending_tasks = records.iter().filter(|r| r.status == "pending").count();
        let completion_rate = if total_tasks > 0 {
            (completed_tasks as f64 / total_tasks as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        let reminder_rows = self.store.get_values(&self.reminders_range()).await?;
        let categories: HashMap<String, String> = data_rows(&reminder_rows)
            .iter()
            .map(|row| (cell(row, 0), cell(row, 4)))
            .collect();

        let mut category_stats: HashMap<String, CategoryStat> = HashMap::new();
        for record in &records {
            let Some(category) = categories.get(&record.reminder_id) else {
                continue;
            };
            if category.is_empty() {
                continue;
            }
            let stat = category_stats.entry(category.clone()).or_default();
            stat.total += 1;
            match record.status.as_str() {
                "completed" => stat.completed += 1,
                "skipped" => stat.skipped += 1,
                "pending" => stat.pending += 1,
                _ => {}
            }
        }

        Ok(Statistics {
            total_tasks,
            completed_tasks,
            skipped_tasks,
            pending_tasks,
            completion_rate,
            category_stats,
        })
    }
}

fn data_rows(rows: &[Vec<String>]) -> &[Vec<String>] {
    if rows.is_empty() {
        rows
    } else {
        &rows[1..]
    }
}

/// Physical row index (header included) of the row whose first cell is `id`.
fn find_by_id(rows: &[Vec<String>], id: &str) -> Option<usize> {
    rows.iter().position(|row| cell(row, 0) == id)
}

fn padded(row: &[String], len: usize) -> Vec<String> {
    let mut out = row.to_vec();
    out.resize(len, String::new());
    out
}

fn child_from_row(row: &[String]) -> Child {
    Child {
        id: cell(row, 0),
        name: cell(row, 1),
        age: cell(row, 2),
        birthday: cell(row, 3),
        avatar: cell(row, 4),
        created_at: cell(row, 5),
        updated_at: cell(row, 6),
        status: non_empty_or(cell(row, 7), "active"),
    }
}

fn reminder_from_row(row: &[String]) -> Reminder {
    Reminder {
        id: cell(row, 0),
        child_id: cell(row, 1),
        title: cell(row, 2),
        description: cell(row, 3),
        category: cell(row, 4),
        reminder_type: cell(row, 5),
        reminder_time: cell(row, 6),
        repeat_rule: cell(row, 7),
        advance_minutes: cell(row, 8).parse().unwrap_or(0),
        enabled: cell(row, 9) == "true",
        created_at: cell(row, 10),
        updated_at: cell(row, 11),
    }
}

fn reminder_to_row(reminder: &Reminder) -> Vec<String> {
    vec![
        reminder.id.clone(),
        reminder.child_id.clone(),
        reminder.title.clone(),
        reminder.description.clone(),
        reminder.category.clone(),
        reminder.reminder_type.clone(),
        reminder.reminder_time.clone(),
        reminder.repeat_rule.clone(),
        reminder.advance_minutes.to_string(),
        reminder.enabled.to_string(),
        reminder.created_at.clone(),
        reminder.updated_at.clone(),
    ]
}

fn record_from_row(row: &[String]) -> CareRecord {
    CareRecord {
        id: cell(row, 0),
        reminder_id: cell(row, 1),
        child_id: cell(row, 2),
        scheduled_time: cell(row, 3),
        completed_time: cell(row, 4),
        status: cell(row, 5),
        note: cell(row, 6),
        operator: cell(row, 7),
        created_at: cell(row, 8),
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Calendar day of a timestamp in any of the formats the sheets hold.
fn parse_day(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(day) = NaiveDate::parse_from_str(value, format) {
            return Some(day);
        }
    }
    None
}

/// Whether a reminder is due on `target`: one-shot reminders match their
/// calendar day, daily reminders always match, weekly ones match the weekday.
fn reminder_falls_on(reminder: &Reminder, target: NaiveDate) -> bool {
    match reminder.reminder_type.as_str() {
        "once" => parse_day(&reminder.reminder_time) == Some(target),
        "daily" => true,
        "weekly" => parse_day(&reminder.reminder_time)
            .map(|day| day.weekday() == target.weekday())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(kind: &str, time: &str) -> Reminder {
        Reminder {
            id: "r1".into(),
            child_id: "c1".into(),
            title: "water".into(),
            description: String::new(),
            category: "1".into(),
            reminder_type: kind.into(),
            reminder_time: time.into(),
            repeat_rule: String::new(),
            advance_minutes: 0,
            enabled: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_parse_day_formats() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_day("2024-03-05T09:30:00+00:00"), Some(day));
        assert_eq!(parse_day("2024-03-05T09:30"), Some(day));
        assert_eq!(parse_day("2024-03-05"), Some(day));
        assert_eq!(parse_day("2024/03/05"), Some(day));
        assert_eq!(parse_day("not a date"), None);
    }

    #[test]
    fn test_once_matches_only_its_day() {
        let target = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(reminder_falls_on(&reminder("once", "2024-03-05T08:00"), target));
        assert!(!reminder_falls_on(&reminder("once", "2024-03-06T08:00"), target));
    }

    #[test]
    fn test_daily_always_matches() {
        let target = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(reminder_falls_on(&reminder("daily", "2020-01-01T08:00"), target));
    }

    #[test]
    fn test_weekly_matches_weekday() {
        // 2024-03-05 and 2024-03-12 are both Tuesdays
        let target = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert!(reminder_falls_on(&reminder("weekly", "2024-03-05T08:00"), target));
        assert!(!reminder_falls_on(&reminder("weekly", "2024-03-06T08:00"), target));
    }

    #[test]
    fn test_find_by_id_uses_first_column() {
        let rows = vec![
            vec!["ID".to_string(), "Name".to_string()],
            vec!["abc".to_string(), "Mia".to_string()],
        ];
        assert_eq!(find_by_id(&rows, "abc"), Some(1));
        assert_eq!(find_by_id(&rows, "zzz"), None);
    }

    #[test]
    fn test_padded_extends_ragged_rows() {
        let row = vec!["a".to_string()];
        assert_eq!(padded(&row, 3), vec!["a".to_string(), String::new(), String::new()]);
    }
}
