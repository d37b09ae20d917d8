///////////////////////////////
/// Threads to use: as requested, else what the machine offers
pub fn determine_thread_counts_1(total: Option<usize>) -> anyhow::Result<usize> {
    if let Some(total) = total {
        if total < 1 {
            anyhow::bail!("Cannot set number of threads to less than 1")
        }
        anyhow::Ok(total)
    } else {
        let total = std::thread::available_parallelism();
        if let Ok(total) = total {
            anyhow::Ok(total.get())
        } else {
            log::warn!("Could not autodetect the number of threads available. Setting to 1, but it is better if you specify");
            anyhow::Ok(1)
        }
    }
}

///////////////////////////////
/// Local rayon pool so the global one stays untouched
pub fn build_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("varcomp-{}", i))
        .build()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_count() {
        assert_eq!(determine_thread_counts_1(Some(3)).unwrap(), 3);
        assert!(determine_thread_counts_1(Some(0)).is_err());
        assert!(determine_thread_counts_1(None).unwrap() >= 1);
    }

    #[test]
    fn pool_size() {
        let pool = build_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
