//! Salary settings: how often the salary is paid and how many hours are worked per week.

mod domain;
mod settings;

pub use domain::{HoursPerWeek, Periodicity, SalaryConfig, load_salary_config, save_salary_config};
pub use settings::{get_salary_settings_page, update_salary_settings_endpoint};
