use std::collections::BTreeMap;
use std::thread;

use crossbeam_channel::bounded;
use log::debug;

/// Fans independent jobs over worker threads.
///
/// Each job owns whatever DP workspace it allocates; shared inputs are
/// borrowed read-only by the job closure.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    threads: usize,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Jobs handed out but not yet passed to the sink.
    pub fn window(&self) -> usize {
        self.threads * 4
    }

    /// Runs `job` on every item and returns the outputs in input order.
    pub fn run<I, O, F>(&self, items: Vec<I>, job: F) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
    {
        let mut outputs = Vec::with_capacity(items.len());
        let collected: Result<(), std::convert::Infallible> = self.for_each_ordered(items, job, |output| {
            outputs.push(output);
            Ok(())
        });
        match collected {
            Ok(()) => outputs,
            Err(never) => match never {},
        }
    }

    /// Streams `items` through `job` and hands every output to `sink` in
    /// input order.
    ///
    /// Items are pulled lazily and at most `window()` of them are in flight,
    /// so memory stays bounded however long the input is. The first sink
    /// error stops the run and is returned.
    pub fn for_each_ordered<It, I, O, E, F, S>(&self, items: It, job: F, mut sink: S) -> Result<(), E>
    where
        It: IntoIterator<Item = I>,
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
        S: FnMut(O) -> Result<(), E>,
    {
        let mut items = items.into_iter().fuse();
        if self.threads == 1 {
            for item in items {
                sink(job(item))?;
            }
            return Ok(());
        }

        let window = self.window();
        let job = &job;

        thread::scope(|scope| {
            // Both channels hold a whole window, so neither side ever blocks
            // on a send.
            let (work_tx, work_rx) = bounded::<(usize, I)>(window);
            let (result_tx, result_rx) = bounded::<(usize, O)>(window);

            for id in 0..self.threads {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let mut done = 0usize;
                    while let Ok((index, item)) = work_rx.recv() {
                        if result_tx.send((index, job(item))).is_err() {
                            break;
                        }
                        done += 1;
                    }
                    debug!("Worker {id} finished {done} jobs");
                });
            }
            drop(work_rx);
            drop(result_tx);

            let mut pending: BTreeMap<usize, O> = BTreeMap::new();
            let (mut sent, mut emitted) = (0usize, 0usize);
            loop {
                while sent - emitted < window {
                    let Some(item) = items.next() else { break };
                    if work_tx.send((sent, item)).is_err() {
                        break;
                    }
                    sent += 1;
                }
                if emitted == sent {
                    break;
                }
                let Ok((index, output)) = result_rx.recv() else {
                    break;
                };
                pending.insert(index, output);
                while let Some(output) = pending.remove(&emitted) {
                    emitted += 1;
                    sink(output)?;
                }
            }
            Ok(())
        })
    }
}
