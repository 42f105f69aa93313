//! Case report data model
//!
//! A case report is a fixed set of ten sections. Five are free text, five are
//! structured records. The wire form (camelCase keys, declaration order) is
//! kept stable because the prompt builder serializes it verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the ten fixed report sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionId {
    #[serde(rename = "hanhChinh")]
    HanhChinh,
    #[serde(rename = "lyDoVaoVien")]
    LyDoVaoVien,
    #[serde(rename = "benhSu")]
    BenhSu,
    #[serde(rename = "tienSu")]
    TienSu,
    #[serde(rename = "khamBenh")]
    KhamBenh,
    #[serde(rename = "tomTatBenhAn")]
    TomTatBenhAn,
    #[serde(rename = "datVanDe")]
    DatVanDe,
    #[serde(rename = "chanDoan")]
    ChanDoan,
    #[serde(rename = "deNghiCLS")]
    DeNghiCls,
    #[serde(rename = "tienLuong")]
    TienLuong,
}

impl SectionId {
    /// All sections in default display order.
    pub const ALL: [SectionId; 10] = [
        SectionId::HanhChinh,
        SectionId::LyDoVaoVien,
        SectionId::BenhSu,
        SectionId::TienSu,
        SectionId::KhamBenh,
        SectionId::TomTatBenhAn,
        SectionId::DatVanDe,
        SectionId::ChanDoan,
        SectionId::DeNghiCls,
        SectionId::TienLuong,
    ];

    /// Stable wire name, matching the serialized report keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::HanhChinh => "hanhChinh",
            SectionId::LyDoVaoVien => "lyDoVaoVien",
            SectionId::BenhSu => "benhSu",
            SectionId::TienSu => "tienSu",
            SectionId::KhamBenh => "khamBenh",
            SectionId::TomTatBenhAn => "tomTatBenhAn",
            SectionId::DatVanDe => "datVanDe",
            SectionId::ChanDoan => "chanDoan",
            SectionId::DeNghiCls => "deNghiCLS",
            SectionId::TienLuong => "tienLuong",
        }
    }

    /// Human-readable section title for display.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::HanhChinh => "I. HÀNH CHÍNH",
            SectionId::LyDoVaoVien => "II. LÝ DO VÀO VIỆN",
            SectionId::BenhSu => "III. BỆNH SỬ",
            SectionId::TienSu => "IV. TIỀN SỬ",
            SectionId::KhamBenh => "V. KHÁM BỆNH",
            SectionId::TomTatBenhAn => "VI. TÓM TẮT BỆNH ÁN",
            SectionId::DatVanDe => "VII. ĐẶT VẤN ĐỀ",
            SectionId::ChanDoan => "VIII. CHẨN ĐOÁN & BIỆN LUẬN",
            SectionId::DeNghiCls => "IX. ĐỀ NGHỊ CẬN LÂM SÀNG",
            SectionId::TienLuong => "X. TIÊN LƯỢNG & HƯỚNG ĐIỀU TRỊ",
        }
    }

    /// Placeholder text shown for an empty section.
    pub fn placeholder(&self) -> &'static str {
        match self {
            SectionId::HanhChinh => "Nhập thông tin hành chính của bệnh nhân...",
            SectionId::LyDoVaoVien => {
                "Ghi triệu chứng chính khiến bệnh nhân nhập viện (VD: Đau ngực trái ngày thứ 2)..."
            }
            SectionId::BenhSu => "Kể lại quá trình bệnh lý từ lúc khởi phát đến khi nhập viện...",
            SectionId::TienSu => "Ghi nhận tiền sử bệnh tật bản thân và gia đình...",
            SectionId::KhamBenh => "Mô tả các dấu hiệu khám được theo từng cơ quan...",
            SectionId::TomTatBenhAn => "Tóm tắt lại các triệu chứng và hội chứng chính...",
            SectionId::DatVanDe => "Liệt kê các vấn đề của bệnh nhân dưới dạng danh sách...",
            SectionId::ChanDoan => "Ghi chẩn đoán sơ bộ, chẩn đoán phân biệt và biện luận...",
            SectionId::DeNghiCls => "Đề nghị các xét nghiệm cần thiết...",
            SectionId::TienLuong => "Dự đoán diễn tiến bệnh và đề ra hướng điều trị...",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = SectionId::ALL.iter().map(|id| id.as_str()).collect();
                format!("unknown section '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Administrative data: patient identity and demographics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HanhChinhData {
    pub ho_ten: String,
    pub tuoi: String,
    pub gioi_tinh: String,
    pub nghe_nghiep: String,
    pub dia_chi: String,
}

/// Personal history, split by specialty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BanThanData {
    pub noi_khoa: String,
    pub ngoai_khoa: String,
    pub di_ung: String,
    pub khac: String,
}

/// Past history: the patient's own history plus family history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TienSuData {
    pub ban_than: BanThanData,
    pub gia_dinh: String,
}

/// Physical exam findings, one free-text field per body system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KhamBenhData {
    pub toan_trang: String,
    pub tuan_hoan: String,
    pub ho_hap: String,
    pub tieu_hoa: String,
    pub than_tiet_nieu: String,
    pub co_xuong_khop: String,
    pub than_kinh: String,
    pub khac: String,
}

/// Display labels for the eight exam systems, in field order.
pub const KHAM_BENH_SYSTEMS: [(&str, &str); 8] = [
    ("toanTrang", "Toàn trạng"),
    ("tuanHoan", "Tuần hoàn"),
    ("hoHap", "Hô hấp"),
    ("tieuHoa", "Tiêu hóa"),
    ("thanTietNieu", "Thận - Tiết niệu"),
    ("coXuongKhop", "Cơ xương khớp"),
    ("thanKinh", "Thần kinh"),
    ("khac", "Các cơ quan khác"),
];

/// Requested investigations, grouped by intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeNghiClsData {
    pub chan_doan: Vec<String>,
    pub theo_doi: Vec<String>,
    pub thuong_quy: Vec<String>,
}

/// The full case report. Always fully populated; section edits replace a
/// section's value wholesale, they never leave a section absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseReport {
    pub hanh_chinh: HanhChinhData,
    pub ly_do_vao_vien: String,
    pub benh_su: String,
    pub tien_su: TienSuData,
    pub kham_benh: KhamBenhData,
    pub tom_tat_benh_an: String,
    pub dat_van_de: Vec<String>,
    pub chan_doan: String,
    #[serde(rename = "deNghiCLS")]
    pub de_nghi_cls: DeNghiClsData,
    pub tien_luong: String,
}

/// Borrowed view of one section's value. Closed over the ten section shapes,
/// so shape dispatch is exhaustiveness-checked instead of stringly-typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionContent<'a> {
    Text(&'a str),
    HanhChinh(&'a HanhChinhData),
    TienSu(&'a TienSuData),
    KhamBenh(&'a KhamBenhData),
    DatVanDe(&'a [String]),
    DeNghiCls(&'a DeNghiClsData),
}

/// A replacement value for one section. One variant per section id, each
/// carrying exactly that section's payload type.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEdit {
    HanhChinh(HanhChinhData),
    LyDoVaoVien(String),
    BenhSu(String),
    TienSu(TienSuData),
    KhamBenh(KhamBenhData),
    TomTatBenhAn(String),
    DatVanDe(Vec<String>),
    ChanDoan(String),
    DeNghiCls(DeNghiClsData),
    TienLuong(String),
}

impl SectionEdit {
    pub fn section_id(&self) -> SectionId {
        match self {
            SectionEdit::HanhChinh(_) => SectionId::HanhChinh,
            SectionEdit::LyDoVaoVien(_) => SectionId::LyDoVaoVien,
            SectionEdit::BenhSu(_) => SectionId::BenhSu,
            SectionEdit::TienSu(_) => SectionId::TienSu,
            SectionEdit::KhamBenh(_) => SectionId::KhamBenh,
            SectionEdit::TomTatBenhAn(_) => SectionId::TomTatBenhAn,
            SectionEdit::DatVanDe(_) => SectionId::DatVanDe,
            SectionEdit::ChanDoan(_) => SectionId::ChanDoan,
            SectionEdit::DeNghiCls(_) => SectionId::DeNghiCls,
            SectionEdit::TienLuong(_) => SectionId::TienLuong,
        }
    }
}

impl CaseReport {
    /// Borrow one section's value.
    pub fn section(&self, id: SectionId) -> SectionContent<'_> {
        match id {
            SectionId::HanhChinh => SectionContent::HanhChinh(&self.hanh_chinh),
            SectionId::LyDoVaoVien => SectionContent::Text(&self.ly_do_vao_vien),
            SectionId::BenhSu => SectionContent::Text(&self.benh_su),
            SectionId::TienSu => SectionContent::TienSu(&self.tien_su),
            SectionId::KhamBenh => SectionContent::KhamBenh(&self.kham_benh),
            SectionId::TomTatBenhAn => SectionContent::Text(&self.tom_tat_benh_an),
            SectionId::DatVanDe => SectionContent::DatVanDe(&self.dat_van_de),
            SectionId::ChanDoan => SectionContent::Text(&self.chan_doan),
            SectionId::DeNghiCls => SectionContent::DeNghiCls(&self.de_nghi_cls),
            SectionId::TienLuong => SectionContent::Text(&self.tien_luong),
        }
    }

    /// Replace one section's value. Synchronous and atomic: the report never
    /// holds a partially applied edit.
    pub fn apply(&mut self, edit: SectionEdit) {
        match edit {
            SectionEdit::HanhChinh(v) => self.hanh_chinh = v,
            SectionEdit::LyDoVaoVien(v) => self.ly_do_vao_vien = v,
            SectionEdit::BenhSu(v) => self.benh_su = v,
            SectionEdit::TienSu(v) => self.tien_su = v,
            SectionEdit::KhamBenh(v) => self.kham_benh = v,
            SectionEdit::TomTatBenhAn(v) => self.tom_tat_benh_an = v,
            SectionEdit::DatVanDe(v) => self.dat_van_de = v,
            SectionEdit::ChanDoan(v) => self.chan_doan = v,
            SectionEdit::DeNghiCls(v) => self.de_nghi_cls = v,
            SectionEdit::TienLuong(v) => self.tien_luong = v,
        }
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl HanhChinhData {
    pub fn is_empty(&self) -> bool {
        blank(&self.ho_ten)
            && blank(&self.tuoi)
            && blank(&self.gioi_tinh)
            && blank(&self.nghe_nghiep)
            && blank(&self.dia_chi)
    }
}

impl TienSuData {
    pub fn is_empty(&self) -> bool {
        blank(&self.ban_than.noi_khoa)
            && blank(&self.ban_than.ngoai_khoa)
            && blank(&self.ban_than.di_ung)
            && blank(&self.ban_than.khac)
            && blank(&self.gia_dinh)
    }
}

impl KhamBenhData {
    pub fn is_empty(&self) -> bool {
        blank(&self.toan_trang)
            && blank(&self.tuan_hoan)
            && blank(&self.ho_hap)
            && blank(&self.tieu_hoa)
            && blank(&self.than_tiet_nieu)
            && blank(&self.co_xuong_khop)
            && blank(&self.than_kinh)
            && blank(&self.khac)
    }
}

impl DeNghiClsData {
    pub fn is_empty(&self) -> bool {
        self.chan_doan.iter().all(|s| blank(s))
            && self.theo_doi.iter().all(|s| blank(s))
            && self.thuong_quy.iter().all(|s| blank(s))
    }
}

impl CaseReport {
    /// Canonical serialization of the whole report: pretty JSON with keys in
    /// display order. Deterministic, so prompts built from equal reports are
    /// equal.
    pub fn canonical_json(&self) -> String {
        // Serializing plain string-field structs cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl SectionContent<'_> {
    /// Whether the section has no analyzable content. Plain text is empty
    /// when blank, the problem list when it has no entries, structured
    /// sections when every leaf is blank.
    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::Text(s) => blank(s),
            SectionContent::HanhChinh(v) => v.is_empty(),
            SectionContent::TienSu(v) => v.is_empty(),
            SectionContent::KhamBenh(v) => v.is_empty(),
            SectionContent::DatVanDe(items) => items.is_empty(),
            SectionContent::DeNghiCls(v) => v.is_empty(),
        }
    }

    /// The section rendered as text: plain text verbatim, structured values
    /// in the same canonical pretty-JSON form as the full report. This is
    /// the text highlight spans are computed against.
    pub fn canonical_text(&self) -> String {
        fn pretty<T: Serialize>(value: &T) -> String {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        match self {
            SectionContent::Text(s) => (*s).to_string(),
            SectionContent::HanhChinh(v) => pretty(v),
            SectionContent::TienSu(v) => pretty(v),
            SectionContent::KhamBenh(v) => pretty(v),
            SectionContent::DatVanDe(items) => pretty(items),
            SectionContent::DeNghiCls(v) => pretty(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_has_all_sections_empty() {
        let report = CaseReport::default();
        for id in SectionId::ALL {
            assert!(report.section(id).is_empty(), "section {} should start empty", id);
        }
    }

    #[test]
    fn test_canonical_json_keeps_sections_in_display_order() {
        let json = CaseReport::default().canonical_json();
        let mut last = 0;
        for id in SectionId::ALL {
            let needle = format!("\"{}\"", id.as_str());
            let pos = json.find(&needle).unwrap_or_else(|| panic!("{} missing", id));
            assert!(pos >= last, "section {} serialized out of order", id);
            last = pos;
        }
    }

    #[test]
    fn test_section_id_round_trips_through_from_str() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
        }
        assert!("khamBenh2".parse::<SectionId>().is_err());
    }

    #[test]
    fn test_apply_replaces_only_the_edited_section() {
        let mut report = CaseReport::default();
        report.apply(SectionEdit::LyDoVaoVien("Khó thở".to_string()));
        assert_eq!(report.ly_do_vao_vien, "Khó thở");
        assert!(report.section(SectionId::BenhSu).is_empty());
        assert!(!report.section(SectionId::LyDoVaoVien).is_empty());
    }

    #[test]
    fn test_edit_carries_its_section_id() {
        assert_eq!(
            SectionEdit::DatVanDe(vec!["Hội chứng vành cấp".to_string()]).section_id(),
            SectionId::DatVanDe
        );
        assert_eq!(
            SectionEdit::HanhChinh(HanhChinhData::default()).section_id(),
            SectionId::HanhChinh
        );
    }

    #[test]
    fn test_structured_emptiness_checks_every_leaf() {
        let mut tien_su = TienSuData::default();
        assert!(tien_su.is_empty());
        tien_su.ban_than.di_ung = "Dị ứng penicillin".to_string();
        assert!(!tien_su.is_empty());

        let mut kham = KhamBenhData::default();
        kham.than_kinh = "   ".to_string();
        assert!(kham.is_empty(), "whitespace-only leaves are still blank");
    }

    #[test]
    fn test_problem_list_emptiness_is_by_length() {
        assert!(SectionContent::DatVanDe(&[]).is_empty());
        let one = vec![String::new()];
        assert!(!SectionContent::DatVanDe(&one).is_empty());
    }

    #[test]
    fn test_investigations_empty_when_all_entries_blank() {
        let mut cls = DeNghiClsData::default();
        assert!(cls.is_empty());
        cls.theo_doi.push("  ".to_string());
        assert!(cls.is_empty());
        cls.chan_doan.push("ECG".to_string());
        assert!(!cls.is_empty());
    }

    #[test]
    fn test_report_deserializes_from_partial_json() {
        let report: CaseReport =
            serde_json::from_str(r#"{"benhSu": "Sốt ngày thứ 3", "datVanDe": ["Sốt"]}"#).unwrap();
        assert_eq!(report.benh_su, "Sốt ngày thứ 3");
        assert_eq!(report.dat_van_de, vec!["Sốt".to_string()]);
        assert!(report.section(SectionId::HanhChinh).is_empty());
    }
}
