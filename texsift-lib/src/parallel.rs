//! Scoped worker pool over an in-memory work list.
//!
//! Workers pull items off a shared queue until it runs dry; the call
//! returns once every item has been processed. With one worker (or one
//! item) no threads are spawned and the items run in order on the caller.

use std::sync::Mutex;

use crate::util;

pub fn for_each<T, F>(workers: usize, items: Vec<T>, work: F)
where
    T: Send,
    F: Fn(T) + Send + Sync,
{
    let count = items.len();
    let workers = workers.clamp(1, count.max(1));

    if workers <= 1 {
        for item in items {
            work(item);
        }
        return;
    }

    let queue = Mutex::new(items.into_iter());
    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let item = util::lock(&queue).next();
                match item {
                    Some(item) => work(item),
                    None => break,
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_all_items_processed() {
        let seen = Mutex::new(Vec::new());
        for_each(4, (0..100).collect(), |n: u32| {
            seen.lock().unwrap().push(n);
        });
        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn test_single_worker_runs_in_order() {
        let seen = Mutex::new(Vec::new());
        for_each(1, vec![3, 1, 4, 1, 5], |n: u32| {
            seen.lock().unwrap().push(n);
        });
        assert_eq!(seen.into_inner().unwrap(), vec![3, 1, 4, 1, 5]);
    }

    #[test]
    fn test_more_workers_than_items() {
        let seen = Mutex::new(0u32);
        for_each(16, vec![1u32, 2, 3], |n| {
            *seen.lock().unwrap() += n;
        });
        assert_eq!(seen.into_inner().unwrap(), 6);
    }

    #[test]
    fn test_empty_items() {
        for_each(4, Vec::<u32>::new(), |_| panic!("no items to run"));
    }
}
