//! Demo roster generation for the in-memory store.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::SeedConfig;
use crate::models::Employee;

use super::MemoryStore;

/// Fills an empty roster with `seed.employees` employees named `employee1..N`,
/// each with a random whole salary in `[min_salary, max_salary]`.
///
/// Does nothing when seeding is disabled, the salary range is inverted, or the
/// roster already has employees.
/// Returns the number of employees added.
///
/// # Example
///
/// ```
/// use payroll_engine::config::SeedConfig;
/// use payroll_engine::store::{seed_roster, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let seed = SeedConfig { employees: 3, ..Default::default() };
/// assert_eq!(seed_roster(&store, &seed).await, 3);
/// assert_eq!(seed_roster(&store, &seed).await, 0);
/// # }
/// ```
pub async fn seed_roster(store: &MemoryStore, seed: &SeedConfig) -> usize {
    if seed.employees == 0 {
        return 0;
    }
    if seed.min_salary > seed.max_salary {
        warn!(
            min_salary = seed.min_salary,
            max_salary = seed.max_salary,
            "Inverted seed salary range; seeding skipped"
        );
        return 0;
    }
    if store.employee_count().await > 0 {
        info!("Roster already populated; seeding skipped");
        return 0;
    }

    let salaries: Vec<u64> = {
        let mut rng = rand::thread_rng();
        (0..seed.employees)
            .map(|_| rng.gen_range(seed.min_salary..=seed.max_salary))
            .collect()
    };

    for (i, salary) in salaries.into_iter().enumerate() {
        store
            .add_employee(Employee::new(format!("employee{}", i + 1), Decimal::from(salary)))
            .await;
    }

    info!(employees = seed.employees, "Demo roster seeded");
    seed.employees
}
