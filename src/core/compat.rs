//! Pairwise physical/electrical checks over a finished build.
//!
//! Every check is a pure function returning `Ok(())` or a human-readable
//! issue. A part missing from either side of a check cannot be evaluated and
//! counts as an issue.

use crate::domain::model::{Build, Category, CompatibilityReport, Part};

pub type CheckResult = std::result::Result<(), String>;

fn present(build: &Build, category: Category) -> Option<&Part> {
    build.get(category).filter(|p| !p.is_placeholder())
}

/// Sockets must be identical strings.
pub fn check_cpu_motherboard(cpu: Option<&Part>, board: Option<&Part>) -> CheckResult {
    let (Some(cpu), Some(board)) = (cpu, board) else {
        return Err("CPU or motherboard missing".to_string());
    };
    if cpu.socket_str().trim() != board.socket_str().trim() {
        return Err(format!(
            "Socket mismatch ({} vs {})",
            cpu.socket_str(),
            board.socket_str()
        ));
    }
    Ok(())
}

/// Memory generations must overlap when both sides declare any.
pub fn check_ram_motherboard(ram: Option<&Part>, board: Option<&Part>) -> CheckResult {
    let (Some(ram), Some(board)) = (ram, board) else {
        return Err("RAM or motherboard missing".to_string());
    };
    let (rset, mset) = (&ram.ram_types, &board.ram_types);
    if !rset.is_empty() && !mset.is_empty() && !rset.intersects(mset) {
        return Err(format!(
            "RAM type mismatch ({} vs {})",
            ram.ram_type_label(),
            board.ram_type_label()
        ));
    }
    Ok(())
}

/// The card must not be longer than the case allows. Unknown lengths pass.
pub fn check_gpu_case(gpu: Option<&Part>, case: Option<&Part>) -> CheckResult {
    let (Some(gpu), Some(case)) = (gpu, case) else {
        return Err("GPU or case missing".to_string());
    };
    if let (Some(gpu_len), Some(case_len)) = (gpu.length_mm, case.max_gpu_length_mm) {
        if gpu_len > case_len {
            return Err(format!("GPU too long ({}mm > {}mm)", gpu_len, case_len));
        }
    }
    Ok(())
}

/// Runs all checks in a fixed order and collects their issues.
pub fn check_compatibility(build: &Build) -> CompatibilityReport {
    let board = present(build, Category::Motherboard);
    let checks = [
        check_cpu_motherboard(present(build, Category::Cpu), board),
        check_ram_motherboard(present(build, Category::Ram), board),
        check_gpu_case(present(build, Category::Gpu), present(build, Category::Case)),
    ];

    let issues: Vec<String> = checks.into_iter().filter_map(|c| c.err()).collect();
    if !issues.is_empty() {
        tracing::debug!(?issues, "compatibility issues found");
    }
    CompatibilityReport::from_issues(issues)
}
