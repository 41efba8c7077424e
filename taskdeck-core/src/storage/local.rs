/// Local filesystem storage backend.
///
/// Manages board documents on disk with:
/// - one JSON document file per board plus a global labels.json
/// - atomic writes (write to .tmp, rename)
/// - per-board mutex-guarded writes to prevent concurrent modification
/// - monotonic per-board versions for ETag support
/// - change events on a broadcast channel for SSE fan-out

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;

use crate::ids::generate_id;
use crate::persist::{BoardSortKey, PersistError, Persistence};
use crate::reorder::engine::{apply_move, MoveCommand};
use crate::types::*;

use super::{
    BoardPatch, BoardStorage, ChangeEvent, NewBoard, NewTask, StorageError, TaskPatch,
};

const LABELS_FILE: &str = "labels.json";

/// State for a single tracked board.
#[derive(Debug, Clone)]
struct BoardState {
    file_path: PathBuf,
    document: BoardDocument,
    /// Monotonic version counter, bumped on every persisted change.
    version: u64,
}

/// Local filesystem board storage.
pub struct LocalStorage {
    data_dir: PathBuf,
    /// board_id -> BoardState
    boards: RwLock<HashMap<String, BoardState>>,
    labels: RwLock<Vec<Label>>,
    /// Per-board write mutex to prevent concurrent modification
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    event_tx: broadcast::Sender<ChangeEvent>,
    /// Global version counter (monotonic, shared across all boards)
    next_version: AtomicU64,
}

impl LocalStorage {
    /// Open a data directory, creating it if needed, and load every board
    /// document found inside. Unreadable documents are skipped with a log
    /// entry rather than failing the whole load.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;

        let storage = Self {
            data_dir: data_dir.to_path_buf(),
            boards: RwLock::new(HashMap::new()),
            labels: RwLock::new(load_labels(&data_dir.join(LABELS_FILE))),
            write_locks: Mutex::new(HashMap::new()),
            event_tx: broadcast::channel(256).0,
            next_version: AtomicU64::new(1),
        };

        let mut loaded = 0usize;
        for entry in fs::read_dir(data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json")
                || path.file_name().and_then(|n| n.to_str()) == Some(LABELS_FILE)
            {
                continue;
            }
            match read_document(&path) {
                Ok(doc) => {
                    let state = BoardState {
                        file_path: path,
                        version: storage.next_version(),
                        document: doc,
                    };
                    storage
                        .boards
                        .write()
                        .unwrap()
                        .insert(state.document.board.id.clone(), state);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!(
                        "[taskdeck.storage.load] Skipping unreadable document {:?}: {}",
                        path,
                        e
                    );
                }
            }
        }
        log::info!(
            "[taskdeck.storage.load] Loaded {} boards from {:?}",
            loaded,
            data_dir
        );
        Ok(storage)
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.event_tx.subscribe()
    }

    /// Get a clone of the broadcast sender (for passing to other components).
    pub fn event_sender(&self) -> broadcast::Sender<ChangeEvent> {
        self.event_tx.clone()
    }

    /// Get the version number for a board (for ETag support).
    pub fn get_board_version(&self, board_id: &str) -> Option<u64> {
        self.boards.read().unwrap().get(board_id).map(|s| s.version)
    }

    fn next_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed)
    }

    fn board_path(&self, board_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", board_id))
    }

    fn board_write_lock(&self, board_id: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .lock()
            .unwrap()
            .entry(board_id.to_string())
            .or_default()
            .clone()
    }

    fn notify(&self, event: ChangeEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Resolve the board owning a column.
    fn board_id_for_column(&self, column_id: &str) -> Option<String> {
        self.boards
            .read()
            .unwrap()
            .values()
            .find(|s| s.document.columns.iter().any(|c| c.id == column_id))
            .map(|s| s.document.board.id.clone())
    }

    /// Resolve the board owning a task (scan, mirroring the engine's
    /// resolve-by-scan).
    fn board_id_for_task(&self, task_id: &str) -> Option<String> {
        self.boards
            .read()
            .unwrap()
            .values()
            .find(|s| s.document.find_task(task_id).is_some())
            .map(|s| s.document.board.id.clone())
    }

    /// Run a mutation against one board document under its write lock.
    /// The closure reports whether it changed anything; unchanged documents
    /// are not rewritten and no event fires.
    fn with_board_mut<R>(
        &self,
        board_id: &str,
        f: impl FnOnce(&mut BoardDocument) -> Result<(R, bool), StorageError>,
    ) -> Result<R, StorageError> {
        let lock = self.board_write_lock(board_id);
        let _guard = lock.lock().unwrap();

        let (mut document, file_path) = {
            let boards = self.boards.read().unwrap();
            let state = boards
                .get(board_id)
                .ok_or_else(|| StorageError::BoardNotFound(board_id.to_string()))?;
            (state.document.clone(), state.file_path.clone())
        };

        let (result, changed) = f(&mut document)?;
        if changed {
            write_document(&file_path, &document)?;
            let state = BoardState {
                file_path,
                document,
                version: self.next_version(),
            };
            self.boards
                .write()
                .unwrap()
                .insert(board_id.to_string(), state);
            self.notify(ChangeEvent::BoardChanged {
                board_id: board_id.to_string(),
            });
        }
        Ok(result)
    }

    fn resolve_labels(&self, label_ids: &[String]) -> Result<Vec<Label>, StorageError> {
        let labels = self.labels.read().unwrap();
        label_ids
            .iter()
            .map(|id| {
                labels
                    .iter()
                    .find(|l| &l.id == id)
                    .cloned()
                    .ok_or_else(|| StorageError::LabelNotFound(id.clone()))
            })
            .collect()
    }

    fn persist_labels(&self, labels: &[Label]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(labels)
            .map_err(|e| StorageError::InvalidDocument(e.to_string()))?;
        atomic_write(&self.data_dir.join(LABELS_FILE), &json)?;
        Ok(())
    }
}

impl BoardStorage for LocalStorage {
    fn list_boards(&self) -> Vec<BoardSummary> {
        let mut summaries: Vec<BoardSummary> = self
            .boards
            .read()
            .unwrap()
            .values()
            .map(|s| BoardSummary::from_document(&s.document))
            .collect();
        summaries.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
        summaries
    }

    fn read_board(&self, board_id: &str) -> Option<BoardDocument> {
        self.boards
            .read()
            .unwrap()
            .get(board_id)
            .map(|s| s.document.clone())
    }

    fn create_board(&self, new: NewBoard) -> Result<BoardDocument, StorageError> {
        let color = new.color.unwrap_or_else(|| COLOR_PALETTE[0].to_string());
        if !is_known_color(&color) {
            return Err(StorageError::InvalidColor(color));
        }
        let labels = self.resolve_labels(&new.label_ids)?;

        let board_id = generate_id();
        let now = Utc::now();
        let sort_order = self
            .boards
            .read()
            .unwrap()
            .values()
            .map(|s| s.document.board.sort_order)
            .fold(-1.0_f64, f64::max)
            + 1.0;

        let columns = DEFAULT_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, title)| ColumnWithTasks {
                id: generate_id(),
                board_id: board_id.clone(),
                title: title.to_string(),
                sort_order: i as i64,
                tasks: Vec::new(),
            })
            .collect();

        let document = BoardDocument {
            board: Board {
                id: board_id.clone(),
                title: new.title,
                description: new.description,
                color,
                sort_order,
                labels,
                total_value: 0.0,
                upcoming_value: 0.0,
                received_value: 0.0,
                retainer_y: 0.0,
                started_date: None,
                created_at: now,
                updated_at: now,
            },
            columns,
        };

        let file_path = self.board_path(&board_id);
        write_document(&file_path, &document)?;
        let state = BoardState {
            file_path,
            document: document.clone(),
            version: self.next_version(),
        };
        self.boards.write().unwrap().insert(board_id, state);
        self.notify(ChangeEvent::BoardListChanged);
        Ok(document)
    }

    fn update_board(&self, board_id: &str, patch: BoardPatch) -> Result<Board, StorageError> {
        if let Some(color) = &patch.color {
            if !is_known_color(color) {
                return Err(StorageError::InvalidColor(color.clone()));
            }
        }
        let labels = match &patch.label_ids {
            Some(ids) => Some(self.resolve_labels(ids)?),
            None => None,
        };

        let board = self.with_board_mut(board_id, |doc| {
            let b = &mut doc.board;
            if let Some(title) = patch.title {
                b.title = title;
            }
            if let Some(description) = patch.description {
                b.description = Some(description);
            }
            if let Some(color) = patch.color {
                b.color = color;
            }
            if let Some(v) = patch.total_value {
                b.total_value = v;
            }
            if let Some(v) = patch.upcoming_value {
                b.upcoming_value = v;
            }
            if let Some(v) = patch.received_value {
                b.received_value = v;
            }
            if let Some(v) = patch.retainer_y {
                b.retainer_y = v;
            }
            if let Some(d) = patch.started_date {
                b.started_date = Some(d);
            }
            if let Some(labels) = labels {
                b.labels = labels;
            }
            b.updated_at = Utc::now();
            Ok((b.clone(), true))
        })?;
        Ok(board)
    }

    fn delete_board(&self, board_id: &str) -> Result<(), StorageError> {
        let lock = self.board_write_lock(board_id);
        let _guard = lock.lock().unwrap();

        let state = self
            .boards
            .write()
            .unwrap()
            .remove(board_id)
            .ok_or_else(|| StorageError::BoardNotFound(board_id.to_string()))?;
        if let Err(e) = fs::remove_file(&state.file_path) {
            log::warn!(
                "[taskdeck.storage.delete] Could not remove {:?}: {}",
                state.file_path,
                e
            );
        }
        self.notify(ChangeEvent::BoardListChanged);
        Ok(())
    }

    fn create_task(&self, column_id: &str, new: NewTask) -> Result<Task, StorageError> {
        let board_id = self
            .board_id_for_column(column_id)
            .ok_or_else(|| StorageError::ColumnNotFound(column_id.to_string()))?;

        self.with_board_mut(&board_id, |doc| {
            let col = doc
                .columns
                .iter_mut()
                .find(|c| c.id == column_id)
                .ok_or_else(|| StorageError::ColumnNotFound(column_id.to_string()))?;
            let now = Utc::now();
            let task = Task {
                id: generate_id(),
                column_id: column_id.to_string(),
                title: new.title,
                description: new.description,
                assignee: new.assignee,
                priority: new.priority,
                due_date: new.due_date,
                sort_order: col.tasks.len() as i64,
                created_at: now,
                updated_at: now,
            };
            col.tasks.push(task.clone());
            Ok((task, true))
        })
    }

    fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<Task, StorageError> {
        let board_id = self
            .board_id_for_task(task_id)
            .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;

        self.with_board_mut(&board_id, |doc| {
            let (ci, ti) = doc
                .find_task(task_id)
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            let task = &mut doc.columns[ci].tasks[ti];
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = Some(description);
            }
            if let Some(assignee) = patch.assignee {
                task.assignee = Some(assignee);
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = Some(due_date);
            }
            task.updated_at = Utc::now();
            Ok((task.clone(), true))
        })
    }

    fn delete_task(&self, task_id: &str) -> Result<(), StorageError> {
        let board_id = self
            .board_id_for_task(task_id)
            .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;

        self.with_board_mut(&board_id, |doc| {
            let (ci, ti) = doc
                .find_task(task_id)
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            doc.columns[ci].tasks.remove(ti);
            reindex_tasks(&mut doc.columns[ci]);
            Ok(((), true))
        })
    }

    fn move_task(
        &self,
        task_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> Result<(), StorageError> {
        let board_id = self
            .board_id_for_column(target_column_id)
            .ok_or_else(|| StorageError::ColumnNotFound(target_column_id.to_string()))?;

        self.with_board_mut(&board_id, |doc| {
            doc.find_task(task_id)
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            let cmd = MoveCommand {
                task_id: task_id.to_string(),
                target_column_id: target_column_id.to_string(),
                new_index,
            };
            // Same splice/append semantics as the in-memory engine; a
            // repositioning no-op is accepted without a rewrite.
            let changed = apply_move(&mut doc.columns, &cmd);
            if changed {
                for col in doc.columns.iter_mut() {
                    reindex_tasks(col);
                }
            }
            Ok(((), changed))
        })
    }

    fn reorder_column(
        &self,
        column_id: &str,
        ordered_task_ids: &[String],
    ) -> Result<(), StorageError> {
        let board_id = self
            .board_id_for_column(column_id)
            .ok_or_else(|| StorageError::ColumnNotFound(column_id.to_string()))?;

        self.with_board_mut(&board_id, |doc| {
            let col = doc
                .columns
                .iter_mut()
                .find(|c| c.id == column_id)
                .ok_or_else(|| StorageError::ColumnNotFound(column_id.to_string()))?;

            let current: HashSet<&str> = col.tasks.iter().map(|t| t.id.as_str()).collect();
            let incoming: HashSet<&str> = ordered_task_ids.iter().map(|s| s.as_str()).collect();
            if current != incoming || ordered_task_ids.len() != col.tasks.len() {
                return Err(StorageError::InvalidDocument(format!(
                    "Order for column {} is not a permutation of its tasks",
                    column_id
                )));
            }

            let before: Vec<String> = col.tasks.iter().map(|t| t.id.clone()).collect();
            let index_of: HashMap<&str, usize> = ordered_task_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.as_str(), i))
                .collect();
            col.tasks.sort_by_key(|t| index_of[t.id.as_str()]);
            reindex_tasks(col);
            Ok(((), before != *ordered_task_ids))
        })
    }

    fn reorder_boards(&self, new_order: &[BoardSortKey]) -> Result<(), StorageError> {
        let mut changed_any = false;
        for key in new_order {
            let changed = self.with_board_mut(&key.id, |doc| {
                if doc.board.sort_order == key.sort_order {
                    return Ok((false, false));
                }
                doc.board.sort_order = key.sort_order;
                Ok((true, true))
            })?;
            changed_any |= changed;
        }
        if changed_any {
            self.notify(ChangeEvent::BoardListChanged);
        }
        Ok(())
    }

    fn list_labels(&self) -> Vec<Label> {
        self.labels.read().unwrap().clone()
    }

    fn create_label(&self, text: &str, color: &str) -> Result<Label, StorageError> {
        if !is_known_color(color) {
            return Err(StorageError::InvalidColor(color.to_string()));
        }
        let label = Label {
            id: generate_id(),
            text: text.to_string(),
            color: color.to_string(),
        };
        let mut labels = self.labels.write().unwrap();
        labels.push(label.clone());
        self.persist_labels(&labels)?;
        drop(labels);
        self.notify(ChangeEvent::BoardListChanged);
        Ok(label)
    }

    fn delete_label(&self, label_id: &str) -> Result<(), StorageError> {
        {
            let mut labels = self.labels.write().unwrap();
            let before = labels.len();
            labels.retain(|l| l.id != label_id);
            if labels.len() == before {
                return Err(StorageError::LabelNotFound(label_id.to_string()));
            }
            self.persist_labels(&labels)?;
        }

        // Strip the label from any board still carrying it.
        let carrying: Vec<String> = self
            .boards
            .read()
            .unwrap()
            .values()
            .filter(|s| s.document.board.labels.iter().any(|l| l.id == label_id))
            .map(|s| s.document.board.id.clone())
            .collect();
        for board_id in carrying {
            self.with_board_mut(&board_id, |doc| {
                doc.board.labels.retain(|l| l.id != label_id);
                Ok(((), true))
            })?;
        }
        self.notify(ChangeEvent::BoardListChanged);
        Ok(())
    }

    fn set_board_labels(
        &self,
        board_id: &str,
        label_ids: &[String],
    ) -> Result<Board, StorageError> {
        let labels = self.resolve_labels(label_ids)?;
        self.with_board_mut(board_id, |doc| {
            doc.board.labels = labels;
            doc.board.updated_at = Utc::now();
            Ok((doc.board.clone(), true))
        })
    }
}

/// The storage backend doubles as the persistence service consumed by the
/// drag controllers.
impl Persistence for LocalStorage {
    fn move_task(
        &self,
        task_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> Result<(), PersistError> {
        Ok(BoardStorage::move_task(
            self,
            task_id,
            target_column_id,
            new_index,
        )?)
    }

    fn reorder_column(
        &self,
        column_id: &str,
        ordered_task_ids: &[String],
    ) -> Result<(), PersistError> {
        Ok(BoardStorage::reorder_column(
            self,
            column_id,
            ordered_task_ids,
        )?)
    }

    fn reorder_boards(&self, new_order: &[BoardSortKey]) -> Result<(), PersistError> {
        Ok(BoardStorage::reorder_boards(self, new_order)?)
    }
}

/// Reassign dense sort keys after an order mutation. Persisted keys may end
/// up sparse through external edits; the vector order stays authoritative.
fn reindex_tasks(col: &mut ColumnWithTasks) {
    for (i, task) in col.tasks.iter_mut().enumerate() {
        task.sort_order = i as i64;
    }
}

fn read_document(path: &Path) -> Result<BoardDocument, StorageError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| StorageError::InvalidDocument(e.to_string()))
}

fn write_document(path: &Path, document: &BoardDocument) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| StorageError::InvalidDocument(e.to_string()))?;
    atomic_write(path, &json)?;
    Ok(())
}

/// Write to a sibling .tmp file, then rename into place.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

fn load_labels(path: &Path) -> Vec<Label> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("[taskdeck.storage.labels] Unreadable labels file: {}", e);
            Vec::new()
        }),
        Err(_) => Vec::new(),
    }
}
