//! Prompt construction for the reviewer model
//!
//! `build` is pure and deterministic: equal (section, report) inputs produce
//! byte-identical prompts. The section-specific task blocks encode the
//! domain checks the reviewer runs for each part of the report.

use crate::report::{CaseReport, SectionId};

const REVIEWER_SYSTEM: &str = r#"You are an expert, friendly, and encouraging Vietnamese medical professor reviewing a 3rd-year medical student's case report. All feedback must be written in Vietnamese.

Your goal is to train the student to think logically and structure the report correctly, not just to catch mistakes. Analyze the current section in the context of the entire report.

RULES:
- Respond with JSON only, matching the requested schema. No markdown, no text outside the JSON object.
- "targetText" must quote the student's text verbatim so the feedback can be anchored in the section; leave it empty for section-level remarks.
- "message" is a short, impactful card title (e.g. "🔴 SAI VỊ TRÍ!"); put explanations and checklists in "details"."#;

const LY_DO_VAO_VIEN_TASK: &str = r#"TASK:
Check whether the reason for admission states a medical diagnosis (e.g. "Suy tim", "Viêm phổi") instead of the patient's own complaint. A reason for admission must be a symptom (e.g. "Khó thở", "Đau ngực"). Report any diagnosis-like phrasing as an error of type "MEDICAL_TERM_USED"."#;

const BENH_SU_TASK: &str = r#"TASKS:
1. Identify the major symptoms (e.g. "đau ngực", "khó thở", "sốt"). For each symptom that is not fully characterized, add a suggestion of type "CLARIFY_SYMPTOM" whose details list the questions still to ask: Vị trí, tính chất, cường độ, hướng lan, yếu tố tăng/giảm, triệu chứng đi kèm.
2. Identify any text describing physical exam findings (e.g. "khám thấy", "ran ẩm", "tim đều", "bụng mềm"). These are misplaced here: add an error of type "WRONG_SECTION" recommending the text be moved to the "khamBenh" section."#;

const TIEN_SU_TASK: &str = r#"TASK:
Identify any chronic diseases mentioned (e.g. "Đái tháo đường", "Tăng huyết áp"). For each one missing key details, add a suggestion of type "INCOMPLETE_HISTORY" asking for clarification: type? duration? treatment? compliance? complications?"#;

const TOM_TAT_BENH_AN_TASK: &str = r#"TASK:
This is a critical logic check. Compare the summary with all previous sections (hanhChinh, lyDoVaoVien, benhSu, tienSu, khamBenh). Any significant clinical detail appearing in the summary (like "sốt 38.5 độ", "vàng da") that was NOT documented in those sections is an error of type "LOGIC_CONFLICT" pointing out that the information has no earlier source."#;

const DAT_VAN_DE_TASK: &str = r#"TASK:
Based on the summary (tomTatBenhAn), identify groups of symptoms and signs that can be clustered into a named medical syndrome (e.g. "Hội chứng nhiễm trùng", "Hội chứng vàng da tắc mật", "Hội chứng suy tim"). For each grouping the student has not yet made, add a suggestion of type "SUGGEST_SYNDROME"."#;

const GENERIC_TASK: &str = r#"TASK:
Provide general feedback on the clarity, structure, and completeness of this section."#;

/// The task block for a section. Five sections have dedicated domain checks;
/// the rest share the generic clarity/completeness instruction.
fn section_task(section: SectionId) -> &'static str {
    match section {
        SectionId::LyDoVaoVien => LY_DO_VAO_VIEN_TASK,
        SectionId::BenhSu => BENH_SU_TASK,
        SectionId::TienSu => TIEN_SU_TASK,
        SectionId::TomTatBenhAn => TOM_TAT_BENH_AN_TASK,
        SectionId::DatVanDe => DAT_VAN_DE_TASK,
        SectionId::HanhChinh
        | SectionId::KhamBenh
        | SectionId::ChanDoan
        | SectionId::DeNghiCls
        | SectionId::TienLuong => GENERIC_TASK,
    }
}

/// Build the full reviewer prompt for one section of the report.
pub fn build(section: SectionId, report: &CaseReport) -> String {
    let full_report = report.canonical_json();
    let content = report.section(section).canonical_text();
    format!(
        "{REVIEWER_SYSTEM}\n\n\
         Here is the student's entire case report so far:\n{full_report}\n\n\
         The student is currently working on the section \"{id}\".\n\
         The content of this section is:\n{content}\n\n\
         {task}",
        id = section.as_str(),
        task = section_task(section),
    )
}
