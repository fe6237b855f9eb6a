use entity::Employee;

/// Headcount split by status, over the whole cached collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl Summary {
    pub fn of(employees: &[Employee]) -> Self {
        let active = employees.iter().filter(|e| e.profile.active).count();
        Self {
            total: employees.len(),
            active,
            inactive: employees.len() - active,
        }
    }

    pub fn active_percent(&self) -> f64 {
        percent(self.active, self.total)
    }

    pub fn inactive_percent(&self) -> f64 {
        percent(self.inactive, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
