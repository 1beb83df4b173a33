use crate::task::Task;

/// Eight-task demonstration project. Its critical path runs through tasks
/// 1, 4 and 7 for a total maximum duration of 29.
pub fn sample_tasks() -> Vec<Task<u32>> {
    vec![
        Task::new(1, [], 4.0, 7.0),
        Task::new(2, [], 8.0, 11.0),
        Task::new(3, [], 3.0, 5.0),
        Task::new(4, [1], 7.0, 10.0),
        Task::new(5, [1, 2, 3], 1.0, 4.0),
        Task::new(6, [3], 9.0, 13.0),
        Task::new(7, [3, 4, 5], 8.0, 12.0),
        Task::new(8, [4], 5.0, 8.0),
    ]
}
