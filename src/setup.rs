use chrono::Utc;

use crate::error::Result;
use crate::family::FamilySheets;
use crate::journal::SheetRef;
use crate::sheets::{SheetInfo, SheetStore};

pub const ARCHIVE_SHEET: &str = "ArchivedThoughts";
pub const CHILDREN_SHEET: &str = "Children";
pub const REMINDERS_SHEET: &str = "Reminders";
pub const RECORDS_SHEET: &str = "Records";
pub const CATEGORIES_SHEET: &str = "Categories";

const FALLBACK_MAIN: &str = "Sheet1";

const ARCHIVE_HEADER: &[&str] = &["Content", "Timestamp", "Date", "ArchivedAt"];
const CHILDREN_HEADER: &[&str] = &[
    "ID", "Name", "Age", "Birthday", "Avatar", "CreatedAt", "UpdatedAt", "Status",
];
const REMINDERS_HEADER: &[&str] = &[
    "ID",
    "ChildId",
    "Title",
    "Description",
    "Category",
    "ReminderType",
    "ReminderTime",
    "RepeatRule",
    "AdvanceMinutes",
    "Enabled",
    "CreatedAt",
    "UpdatedAt",
];
const RECORDS_HEADER: &[&str] = &[
    "ID",
    "ReminderId",
    "ChildId",
    "ScheduledTime",
    "CompletedTime",
    "Status",
    "Note",
    "Operator",
    "CreatedAt",
];
const CATEGORIES_HEADER: &[&str] = &[
    "ID",
    "Name",
    "Icon",
    "Color",
    "Order",
    "Description",
    "CreatedAt",
];

/// (id, name, icon, color, order, description)
const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("1", "Water", "💧", "#4FC3F7", "1", "Hydration reminders"),
    ("2", "Vitamins", "💊", "#66BB6A", "2", "Vitamins and supplements"),
    ("3", "Brush teeth", "🦷", "#FF7043", "3", "Morning and evening brushing"),
    ("4", "Nap", "😴", "#9575CD", "4", "Nap and bedtime"),
    ("5", "Exercise", "🏃", "#FFB74D", "5", "Outdoor play and exercise"),
    ("6", "Iron", "🩸", "#F06292", "6", "Iron supplements"),
    ("7", "Medicine", "💉", "#EF5350", "7", "Prescribed medication"),
    ("8", "Homework", "📚", "#5C6BC0", "8", "Homework and study"),
    ("9", "Other", "📌", "#78909C", "9", "Everything else"),
];

/// Worksheets the app runs against, resolved at startup.
#[derive(Debug, Clone)]
pub struct ResolvedSheets {
    pub main: SheetRef,
    pub archive: SheetRef,
    pub family: FamilySheets,
}

/// Discovers the journal sheet and provisions any missing worksheets.
///
/// The main sheet is whichever worksheet is titled "thoughts"
/// (case-insensitive), else the first worksheet of the spreadsheet. The
/// archive and family sheets are created with headers on first run;
/// provisioning failures are logged and tolerated so a partially set up
/// spreadsheet still serves the routes whose sheets exist.
pub async fn initialize<S: SheetStore>(store: &S) -> Result<ResolvedSheets> {
    let mut sheets = store.list_sheets().await?;

    let main = sheets
        .iter()
        .find(|s| s.title.eq_ignore_ascii_case("thoughts"))
        .or_else(|| sheets.first())
        .map(sheet_ref)
        .unwrap_or_else(|| SheetRef {
            title: FALLBACK_MAIN.to_string(),
            sheet_id: 0,
        });
    tracing::info!("journal sheet: {} (id {})", main.title, main.sheet_id);

    let mut created = false;
    created |= ensure_sheet(store, &sheets, ARCHIVE_SHEET, ARCHIVE_HEADER).await;
    created |= ensure_sheet(store, &sheets, CHILDREN_SHEET, CHILDREN_HEADER).await;
    created |= ensure_sheet(store, &sheets, REMINDERS_SHEET, REMINDERS_HEADER).await;
    created |= ensure_sheet(store, &sheets, RECORDS_SHEET, RECORDS_HEADER).await;
    if ensure_sheet(store, &sheets, CATEGORIES_SHEET, CATEGORIES_HEADER).await {
        created = true;
        seed_categories(store).await;
    }

    // re-list once so the fresh worksheets get their real ids
    if created {
        match store.list_sheets().await {
            Ok(fresh) => sheets = fresh,
            Err(err) => tracing::warn!("could not re-list sheets after setup: {}", err),
        }
        for sheet in &sheets {
            let columns = match sheet.title.as_str() {
                ARCHIVE_SHEET => ARCHIVE_HEADER.len(),
                CHILDREN_SHEET => CHILDREN_HEADER.len(),
                REMINDERS_SHEET => REMINDERS_HEADER.len(),
                RECORDS_SHEET => RECORDS_HEADER.len(),
                CATEGORIES_SHEET => CATEGORIES_HEADER.len(),
                _ => continue,
            };
            if let Err(err) = store.format_header_bold(sheet.sheet_id, columns as i64).await {
                tracing::warn!("could not bold header of {}: {}", sheet.title, err);
            }
        }
    }

    Ok(ResolvedSheets {
        main,
        archive: resolve(&sheets, ARCHIVE_SHEET),
        family: FamilySheets {
            children: resolve(&sheets, CHILDREN_SHEET),
            reminders: resolve(&sheets, REMINDERS_SHEET),
            records: resolve(&sheets, RECORDS_SHEET),
            categories: resolve(&sheets, CATEGORIES_SHEET),
        },
    })
}

fn sheet_ref(info: &SheetInfo) -> SheetRef {
    SheetRef {
        title: info.title.clone(),
        sheet_id: info.sheet_id,
    }
}

fn resolve(sheets: &[SheetInfo], title: &str) -> SheetRef {
    sheets
        .iter()
        .find(|s| s.title == title)
        .map(sheet_ref)
        .unwrap_or_else(|| SheetRef {
            title: title.to_string(),
            sheet_id: 0,
        })
}

/// Creates `title` with its header row if absent. Returns whether it was
/// created; failures only warn.
async fn ensure_sheet<S: SheetStore>(
    store: &S,
    sheets: &[SheetInfo],
    title: &str,
    header: &[&str],
) -> bool {
    if sheets.iter().any(|s| s.title == title) {
        return false;
    }

    tracing::info!("creating sheet {}", title);
    if let Err(err) = store.add_sheet(title).await {
        tracing::warn!("could not create sheet {}: {}", title, err);
        return false;
    }

    let header_row = header.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    if let Err(err) = store
        .update_values(&format!("{title}!A1"), vec![header_row])
        .await
    {
        tracing::warn!("could not write header of {}: {}", title, err);
    }
    true
}

async fn seed_categories<S: SheetStore>(store: &S) {
    let now = Utc::now().to_rfc3339();
    for (id, name, icon, color, order, description) in DEFAULT_CATEGORIES {
        let row = vec![
            id.to_string(),
            name.to_string(),
            icon.to_string(),
            color.to_string(),
            order.to_string(),
            description.to_string(),
            now.clone(),
        ];
        if let Err(err) = store
            .append_row(&format!("{CATEGORIES_SHEET}!A:G"), row)
            .await
        {
            tracing::warn!("could not seed category {}: {}", name, err);
        }
    }
}
