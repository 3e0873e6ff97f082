use std::path::PathBuf;

use keypoints_storage::{
    CounterLock, CounterStore, DictionaryWriter, FileCounterStore, IdAllocator, LockOptions,
};
use tracing::debug;

use crate::config::InstrumentationConfig;
use crate::features::instrumentation::domain::{InstrumentationPlan, Module};
use crate::features::instrumentation::infrastructure::{apply_plan, walk_module};
use crate::features::instrumentation::ports::IrInserter;
use crate::shared::models::Result;

/// One pass over one compilation unit
///
/// validate → (lock) → load counter → walk → append dictionary → persist
/// counter. A corrupt counter aborts before anything is decided; any error
/// leaves the counter untouched.
pub struct InstrumentUnitUseCase<S: CounterStore> {
    store: S,
    dictionary: DictionaryWriter,
    lock: Option<(PathBuf, LockOptions)>,
}

impl InstrumentUnitUseCase<FileCounterStore> {
    /// File-backed pass using the paths and lock policy of `config`
    pub fn from_config(config: &InstrumentationConfig) -> Result<Self> {
        config.validate()?;

        let counter_path = config.counter_path();
        let usecase = Self::new(
            FileCounterStore::new(&counter_path),
            DictionaryWriter::new(config.dictionary_path()),
        );
        Ok(if config.lock_counter {
            usecase.with_lock(counter_path, config.lock_options())
        } else {
            usecase
        })
    }
}

impl<S: CounterStore> InstrumentUnitUseCase<S> {
    pub fn new(store: S, dictionary: DictionaryWriter) -> Self {
        Self {
            store,
            dictionary,
            lock: None,
        }
    }

    /// Hold an advisory lock on `counter_path` across read-allocate-write
    pub fn with_lock(mut self, counter_path: impl Into<PathBuf>, options: LockOptions) -> Self {
        self.lock = Some((counter_path.into(), options));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide the instrumentation of `module` and persist its side effects
    pub fn execute(&mut self, module: &Module) -> Result<InstrumentationPlan> {
        module.validate()?;

        let _guard = match &self.lock {
            Some((path, options)) => Some(CounterLock::acquire(path, *options)?),
            None => None,
        };

        let start = self.store.load()?;
        let (plan, stats) = walk_module(module, IdAllocator::new(start))?;

        self.dictionary.append(&plan.entries)?;
        self.store.persist(plan.next_id)?;

        debug!(
            "{}: ids {}..{} over {} statements",
            module.source_file, start, plan.next_id, stats.statements
        );
        Ok(plan)
    }

    /// `execute`, then insert the runtime calls into `module` itself
    pub fn execute_and_apply(&mut self, module: &mut Module) -> Result<InstrumentationPlan> {
        let plan = self.execute(module)?;
        apply_plan(module, &plan)?;
        Ok(plan)
    }

    /// `execute`, then insert the runtime calls through an external host
    pub fn execute_into<H: IrInserter + ?Sized>(&mut self, module: &Module, host: &mut H) -> Result<InstrumentationPlan> {
        let plan = self.execute(module)?;
        apply_plan(host, &plan)?;
        Ok(plan)
    }
}
