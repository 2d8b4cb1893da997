use keystone_common::Key;
use keystone_storage::{Cf, Engine, Snapshot, WriteBatch};

use crate::commands::{
    self, BatchGetRequest, BatchGetResponse, BatchRollbackRequest, BatchRollbackResponse,
    CheckTxnStatusRequest, CheckTxnStatusResponse, CleanupRequest, CleanupResponse, Command,
    CommandResponse, CommitRequest, CommitResponse, GetRequest, GetResponse, PrewriteRequest,
    PrewriteResponse, RawDeleteRequest, RawDeleteResponse, RawGetRequest, RawGetResponse,
    RawPutRequest, RawPutResponse, RawScanRequest, RawScanResponse, ResolveLockRequest,
    ResolveLockResponse, ScanLockRequest, ScanLockResponse, ScanRequest, ScanResponse,
};
use crate::config::SchedulerConfig;
use crate::error::{TxnError, TxnResult};
use crate::latch::Latches;
use crate::reader::MvccReader;

/// Orchestrates command execution against a storage engine.
///
/// For mutating commands the flow is: acquire latches over the command's
/// declared keys → take a snapshot → run the command logic → apply the
/// resulting write batch atomically → release latches (the guard drops after
/// the batch is applied, never before). Pure reads take a snapshot without
/// latching; raw commands go straight to the engine.
pub struct Scheduler<E: Engine> {
    engine: E,
    latches: Latches,
    config: SchedulerConfig,
}

impl<E: Engine> Scheduler<E> {
    pub fn new(engine: E, config: SchedulerConfig) -> Self {
        let latches = Latches::new(config.latch_slots);
        Self {
            engine,
            latches,
            config,
        }
    }

    pub fn with_default_config(engine: E) -> Self {
        Self::new(engine, SchedulerConfig::default())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Execute one decoded command. Every verb is handled here; adding a
    /// variant to [`Command`] without a match arm is a compile error.
    pub fn execute(&self, command: Command) -> TxnResult<CommandResponse> {
        match command {
            Command::Get(req) => self.get(req).map(CommandResponse::Get),
            Command::BatchGet(req) => self.batch_get(req).map(CommandResponse::BatchGet),
            Command::Scan(req) => self.scan(req).map(CommandResponse::Scan),
            Command::Prewrite(req) => self.prewrite(req).map(CommandResponse::Prewrite),
            Command::Commit(req) => self.commit(req).map(CommandResponse::Commit),
            Command::Cleanup(req) => self.cleanup(req).map(CommandResponse::Cleanup),
            Command::BatchRollback(req) => {
                self.batch_rollback(req).map(CommandResponse::BatchRollback)
            }
            Command::CheckTxnStatus(req) => self
                .check_txn_status(req)
                .map(CommandResponse::CheckTxnStatus),
            Command::ScanLock(req) => self.scan_lock(req).map(CommandResponse::ScanLock),
            Command::ResolveLock(req) => self.resolve_lock(req).map(CommandResponse::ResolveLock),
            Command::RawGet(req) => self.raw_get(req).map(CommandResponse::RawGet),
            Command::RawPut(req) => self.raw_put(req).map(CommandResponse::RawPut),
            Command::RawDelete(req) => self.raw_delete(req).map(CommandResponse::RawDelete),
            Command::RawScan(req) => self.raw_scan(req).map(CommandResponse::RawScan),
        }
    }

    // ---- Transactional read path ----

    pub fn get(&self, req: GetRequest) -> TxnResult<GetResponse> {
        let snap = self.engine.snapshot()?;
        commands::get::process(&req, &MvccReader::new(&snap))
    }

    pub fn batch_get(&self, req: BatchGetRequest) -> TxnResult<BatchGetResponse> {
        let snap = self.engine.snapshot()?;
        commands::get::process_batch(&req, &MvccReader::new(&snap))
    }

    pub fn scan(&self, req: ScanRequest) -> TxnResult<ScanResponse> {
        let snap = self.engine.snapshot()?;
        commands::scan::process(&req, &MvccReader::new(&snap), &self.config)
    }

    pub fn scan_lock(&self, req: ScanLockRequest) -> TxnResult<ScanLockResponse> {
        let snap = self.engine.snapshot()?;
        commands::scan_lock::process(&req, &MvccReader::new(&snap), &self.config)
    }

    // ---- Transactional write path ----

    pub fn prewrite(&self, req: PrewriteRequest) -> TxnResult<PrewriteResponse> {
        if req.mutations.is_empty() {
            return Err(TxnError::InvalidArgument(
                "prewrite requires at least one mutation".into(),
            ));
        }
        if !req
            .mutations
            .iter()
            .any(|mutation| mutation.key() == req.primary.as_slice())
        {
            return Err(TxnError::InvalidArgument(
                "primary key must be one of the mutation keys".into(),
            ));
        }
        let keys: Vec<Key> = req
            .mutations
            .iter()
            .map(|mutation| mutation.key().to_vec())
            .collect();
        let _guard = self.latches.acquire(&keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::prewrite::process(&req, &MvccReader::new(&snap), &self.config)?;
        self.apply(batch)?;
        Ok(resp)
    }

    pub fn commit(&self, req: CommitRequest) -> TxnResult<CommitResponse> {
        if req.commit_ts <= req.start_ts {
            return Err(TxnError::InvalidArgument(format!(
                "commit_ts {:?} must be greater than start_ts {:?}",
                req.commit_ts, req.start_ts
            )));
        }
        let _guard = self.latches.acquire(&req.keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::commit::process(&req, &MvccReader::new(&snap))?;
        self.apply(batch)?;
        Ok(resp)
    }

    pub fn cleanup(&self, req: CleanupRequest) -> TxnResult<CleanupResponse> {
        let keys = vec![req.key.clone()];
        let _guard = self.latches.acquire(&keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::rollback::process_cleanup(&req, &MvccReader::new(&snap))?;
        self.apply(batch)?;
        Ok(resp)
    }

    pub fn batch_rollback(&self, req: BatchRollbackRequest) -> TxnResult<BatchRollbackResponse> {
        let _guard = self.latches.acquire(&req.keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::rollback::process_batch(&req, &MvccReader::new(&snap))?;
        self.apply(batch)?;
        Ok(resp)
    }

    pub fn check_txn_status(&self, req: CheckTxnStatusRequest) -> TxnResult<CheckTxnStatusResponse> {
        let keys = vec![req.primary.clone()];
        let _guard = self.latches.acquire(&keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::check_txn_status::process(&req, &MvccReader::new(&snap))?;
        self.apply(batch)?;
        Ok(resp)
    }

    pub fn resolve_lock(&self, req: ResolveLockRequest) -> TxnResult<ResolveLockResponse> {
        if let Some(commit_ts) = req.commit_ts {
            if commit_ts <= req.start_ts {
                return Err(TxnError::InvalidArgument(format!(
                    "commit_ts {:?} must be greater than start_ts {:?}",
                    commit_ts, req.start_ts
                )));
            }
        }
        // With no explicit key list, discover the transaction's keys from the
        // Lock family first, then latch them. The per-key processing skips
        // locks that changed hands in between, so the unlatched scan is safe.
        // The discovery scan is bounded; callers repeat until resolved == 0.
        let keys = if req.keys.is_empty() {
            let snap = self.engine.snapshot()?;
            let reader = MvccReader::new(&snap);
            reader
                .scan_locks(req.start_ts, self.config.max_scan_limit)?
                .into_iter()
                .filter(|(_, lock)| lock.start_ts == req.start_ts)
                .map(|(key, _)| key)
                .collect()
        } else {
            req.keys.clone()
        };
        let _guard = self.latches.acquire(&keys);
        let snap = self.engine.snapshot()?;
        let (resp, batch) = commands::resolve_lock::process(&req, &keys, &MvccReader::new(&snap))?;
        self.apply(batch)?;
        Ok(resp)
    }

    // ---- Raw path ----

    pub fn raw_get(&self, req: RawGetRequest) -> TxnResult<RawGetResponse> {
        let snap = self.engine.snapshot()?;
        Ok(RawGetResponse {
            value: snap.get_cf(Cf::Default, &req.key)?,
        })
    }

    pub fn raw_put(&self, req: RawPutRequest) -> TxnResult<RawPutResponse> {
        let mut batch = WriteBatch::new();
        batch.put(Cf::Default, req.key, req.value);
        self.engine.write(batch)?;
        Ok(RawPutResponse)
    }

    pub fn raw_delete(&self, req: RawDeleteRequest) -> TxnResult<RawDeleteResponse> {
        let mut batch = WriteBatch::new();
        batch.delete(Cf::Default, req.key);
        self.engine.write(batch)?;
        Ok(RawDeleteResponse)
    }

    pub fn raw_scan(&self, req: RawScanRequest) -> TxnResult<RawScanResponse> {
        let limit = req.limit.min(self.config.max_scan_limit);
        let snap = self.engine.snapshot()?;
        let pairs = snap
            .iter_cf(Cf::Default, &req.start_key)?
            .take(limit)
            .collect();
        Ok(RawScanResponse { pairs })
    }

    fn apply(&self, batch: WriteBatch) -> TxnResult<()> {
        if !batch.is_empty() {
            self.engine.write(batch)?;
        }
        Ok(())
    }
}
