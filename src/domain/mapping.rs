use serde::{Deserialize, Serialize};
use std::fmt;

/// 代表「未選擇來源」的特殊記號
pub const UNSET_TOKEN: &str = "__empty__";

/// 需要在轉換時動態組合的地址種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Generic,
    Pickup,
    Shipping,
    Invoice,
}

impl AddressKind {
    pub const ALL: [AddressKind; 4] = [
        AddressKind::Generic,
        AddressKind::Pickup,
        AddressKind::Shipping,
        AddressKind::Invoice,
    ];

    pub fn token(self) -> &'static str {
        match self {
            AddressKind::Generic => "__concatenated_address__",
            AddressKind::Pickup => "__pickup_address__",
            AddressKind::Shipping => "__shipping_address__",
            AddressKind::Invoice => "__invoice_address__",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// 交易文件上存放此地址的子物件
    pub fn container_key(self) -> &'static str {
        match self {
            AddressKind::Generic | AddressKind::Shipping => "shippingAddress",
            AddressKind::Pickup => "orderPickupDetails",
            AddressKind::Invoice => "invoiceAddress",
        }
    }

    /// 依序組合的子欄位
    pub fn part_keys(self) -> &'static [&'static str] {
        match self {
            AddressKind::Pickup => &["pickupAddress", "pickupCity", "pickupSuburb", "pickupPostCode"],
            AddressKind::Generic | AddressKind::Shipping | AddressKind::Invoice => {
                &["streetAddress", "city", "suburb", "postCode", "country"]
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AddressKind::Generic => "Concatenated Address",
            AddressKind::Pickup => "Pickup Address",
            AddressKind::Shipping => "Shipping Address",
            AddressKind::Invoice => "Invoice Address",
        }
    }
}

/// 對照項目的來源：未選擇、虛擬地址、或點分隔路徑
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceField {
    #[default]
    Unset,
    Address(AddressKind),
    Path(String),
}

impl SourceField {
    pub fn path(path: impl Into<String>) -> Self {
        Self::from(path.into())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, SourceField::Unset)
    }

    pub fn as_token(&self) -> &str {
        match self {
            SourceField::Unset => UNSET_TOKEN,
            SourceField::Address(kind) => kind.token(),
            SourceField::Path(path) => path,
        }
    }
}

impl From<String> for SourceField {
    fn from(value: String) -> Self {
        if value.is_empty() || value == UNSET_TOKEN {
            return SourceField::Unset;
        }
        match AddressKind::from_token(&value) {
            Some(kind) => SourceField::Address(kind),
            None => SourceField::Path(value),
        }
    }
}

impl From<&str> for SourceField {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SourceField> for String {
    fn from(value: SourceField) -> Self {
        match value {
            SourceField::Path(path) => path,
            other => other.as_token().to_string(),
        }
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// 明細欄位只能對應單層 key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineItemSource {
    #[default]
    Unset,
    Key(String),
}

impl LineItemSource {
    pub fn is_unset(&self) -> bool {
        matches!(self, LineItemSource::Unset)
    }
}

impl From<String> for LineItemSource {
    fn from(value: String) -> Self {
        if value.is_empty() || value == UNSET_TOKEN {
            LineItemSource::Unset
        } else {
            LineItemSource::Key(value)
        }
    }
}

impl From<&str> for LineItemSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<LineItemSource> for String {
    fn from(value: LineItemSource) -> Self {
        match value {
            LineItemSource::Unset => UNSET_TOKEN.to_string(),
            LineItemSource::Key(key) => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SanitizeOp {
    Trim,
    ToUpperCase,
    ToLowerCase,
    StringToNumber,
    NumberToString,
}

impl SanitizeOp {
    /// 與此操作互斥的轉換
    pub fn exclusive_with(self) -> Option<SanitizeOp> {
        match self {
            SanitizeOp::StringToNumber => Some(SanitizeOp::NumberToString),
            SanitizeOp::NumberToString => Some(SanitizeOp::StringToNumber),
            _ => None,
        }
    }
}

/// 有序、不重複的清理步驟集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SanitizeOp>", into = "Vec<SanitizeOp>")]
pub struct SanitizeOperations(Vec<SanitizeOp>);

impl SanitizeOperations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[SanitizeOp] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, op: SanitizeOp) -> bool {
        self.0.contains(&op)
    }

    /// 加入操作；若已存在則維持原位置。加入轉換類操作時會移除互斥的另一個。
    pub fn with(mut self, op: SanitizeOp) -> Self {
        if let Some(other) = op.exclusive_with() {
            self.0.retain(|existing| *existing != other);
        }
        if !self.0.contains(&op) {
            self.0.push(op);
        }
        self
    }

    pub fn without(mut self, op: SanitizeOp) -> Self {
        self.0.retain(|existing| *existing != op);
        self
    }
}

impl TryFrom<Vec<SanitizeOp>> for SanitizeOperations {
    type Error = String;

    fn try_from(ops: Vec<SanitizeOp>) -> Result<Self, Self::Error> {
        if ops.contains(&SanitizeOp::StringToNumber) && ops.contains(&SanitizeOp::NumberToString) {
            return Err("stringToNumber and numberToString cannot both be active".to_string());
        }
        Ok(ops.into_iter().fold(Self::new(), Self::with))
    }
}

impl From<SanitizeOperations> for Vec<SanitizeOp> {
    fn from(value: SanitizeOperations) -> Self {
        value.0
    }
}

impl FromIterator<SanitizeOp> for SanitizeOperations {
    fn from_iter<I: IntoIterator<Item = SanitizeOp>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Date,
    Array,
}

/// 帳戶、訂單與明細對照項目共用的行為。
/// 修改一律透過回傳新值的 builder 方法。
pub trait FieldRule: Clone {
    fn target_field(&self) -> &str;
    fn is_required(&self) -> bool;
    fn has_source(&self) -> bool;
    fn sanitize_enabled(&self) -> bool;
    fn operations(&self) -> &SanitizeOperations;
    fn literal_override(&self) -> &str;

    fn operations_mut(&mut self) -> &mut SanitizeOperations;
    fn literal_override_mut(&mut self) -> &mut String;
    fn set_sanitize(&mut self, enabled: bool);

    fn has_literal_override(&self) -> bool {
        !self.literal_override().trim().is_empty()
    }

    fn is_mapped(&self) -> bool {
        self.has_source() || self.has_literal_override()
    }

    fn with_sanitize(mut self, enabled: bool) -> Self {
        self.set_sanitize(enabled);
        self
    }

    /// 自訂值生效時不接受清理步驟
    fn with_operation(mut self, op: SanitizeOp) -> Self {
        if self.has_literal_override() {
            tracing::trace!(
                "ignoring {:?} on '{}': literal override is active",
                op,
                self.target_field()
            );
            return self;
        }
        let ops = std::mem::take(self.operations_mut());
        *self.operations_mut() = ops.with(op);
        self
    }

    fn without_operation(mut self, op: SanitizeOp) -> Self {
        let ops = std::mem::take(self.operations_mut());
        *self.operations_mut() = ops.without(op);
        self
    }

    fn with_literal_override(mut self, value: impl Into<String>) -> Self {
        *self.literal_override_mut() = value.into();
        if self.has_literal_override() {
            *self.operations_mut() = SanitizeOperations::new();
        }
        self
    }
}

/// 單一帳戶或訂單層級的對照規則
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub target_field: String,
    #[serde(default)]
    pub source_field: SourceField,
    #[serde(default)]
    pub sanitize: bool,
    #[serde(default)]
    pub sanitize_operations: SanitizeOperations,
    #[serde(default)]
    pub literal_override: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub declared_type: ValueType,
    #[serde(default)]
    pub email_validation: bool,
}

impl MappingEntry {
    pub fn new(target_field: impl Into<String>, source_field: impl Into<SourceField>) -> Self {
        Self {
            target_field: target_field.into(),
            source_field: source_field.into(),
            sanitize: false,
            sanitize_operations: SanitizeOperations::new(),
            literal_override: String::new(),
            required: false,
            declared_type: ValueType::String,
            email_validation: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_email_validation(mut self) -> Self {
        self.email_validation = true;
        self
    }

    pub fn with_declared_type(mut self, declared_type: ValueType) -> Self {
        self.declared_type = declared_type;
        self
    }

    pub fn with_source(mut self, source_field: impl Into<SourceField>) -> Self {
        self.source_field = source_field.into();
        self
    }
}

impl FieldRule for MappingEntry {
    fn target_field(&self) -> &str {
        &self.target_field
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn has_source(&self) -> bool {
        !self.source_field.is_unset()
    }

    fn sanitize_enabled(&self) -> bool {
        self.sanitize
    }

    fn operations(&self) -> &SanitizeOperations {
        &self.sanitize_operations
    }

    fn literal_override(&self) -> &str {
        &self.literal_override
    }

    fn operations_mut(&mut self) -> &mut SanitizeOperations {
        &mut self.sanitize_operations
    }

    fn literal_override_mut(&mut self) -> &mut String {
        &mut self.literal_override
    }

    fn set_sanitize(&mut self, enabled: bool) {
        self.sanitize = enabled;
    }
}

/// 訂單明細的對照規則，來源只對應單一明細物件上的 key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemMappingEntry {
    pub target_field: String,
    #[serde(default)]
    pub source_field: LineItemSource,
    #[serde(default)]
    pub sanitize: bool,
    #[serde(default)]
    pub sanitize_operations: SanitizeOperations,
    #[serde(default)]
    pub literal_override: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub declared_type: ValueType,
}

impl LineItemMappingEntry {
    pub fn new(target_field: impl Into<String>, source_key: impl Into<LineItemSource>) -> Self {
        Self {
            target_field: target_field.into(),
            source_field: source_key.into(),
            sanitize: false,
            sanitize_operations: SanitizeOperations::new(),
            literal_override: String::new(),
            required: false,
            declared_type: ValueType::String,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_declared_type(mut self, declared_type: ValueType) -> Self {
        self.declared_type = declared_type;
        self
    }

    pub fn with_source(mut self, source_key: impl Into<LineItemSource>) -> Self {
        self.source_field = source_key.into();
        self
    }
}

impl FieldRule for LineItemMappingEntry {
    fn target_field(&self) -> &str {
        &self.target_field
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn has_source(&self) -> bool {
        !self.source_field.is_unset()
    }

    fn sanitize_enabled(&self) -> bool {
        self.sanitize
    }

    fn operations(&self) -> &SanitizeOperations {
        &self.sanitize_operations
    }

    fn literal_override(&self) -> &str {
        &self.literal_override
    }

    fn operations_mut(&mut self) -> &mut SanitizeOperations {
        &mut self.sanitize_operations
    }

    fn literal_override_mut(&mut self) -> &mut String {
        &mut self.literal_override
    }

    fn set_sanitize(&mut self, enabled: bool) {
        self.sanitize = enabled;
    }
}

/// 一組依宣告順序套用的對照項目（例如帳戶欄位、訂單欄位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingGroup {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<MappingEntry>,
}

impl MappingGroup {
    pub fn new(name: impl Into<String>, entries: Vec<MappingEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// 「N/M mapped」計數：必填欄位中已有來源或自訂值的數量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingCoverage {
    pub mapped: usize,
    pub required: usize,
}

impl MappingCoverage {
    pub fn of<'a, E: FieldRule + 'a>(entries: impl IntoIterator<Item = &'a E>) -> Self {
        entries
            .into_iter()
            .filter(|entry| entry.is_required())
            .fold(Self { mapped: 0, required: 0 }, |acc, entry| Self {
                mapped: acc.mapped + usize::from(entry.is_mapped()),
                required: acc.required + 1,
            })
    }

    pub fn is_complete(&self) -> bool {
        self.mapped == self.required
    }
}

impl fmt::Display for MappingCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} mapped", self.mapped, self.required)
    }
}

/// 不可變的對照項目清單，以索引做 copy-on-write 更新
#[derive(Debug, Clone, PartialEq)]
pub struct MappingSet<E: FieldRule = MappingEntry> {
    entries: Vec<E>,
}

impl<E: FieldRule> MappingSet<E> {
    pub fn new(entries: Vec<E>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<E> {
        self.entries
    }

    /// 回傳更新過指定項目的新集合；索引超出範圍時回傳原樣的副本
    pub fn update(&self, index: usize, f: impl FnOnce(E) -> E) -> Self {
        let mut entries = self.entries.clone();
        match entries.get(index).cloned() {
            Some(entry) => entries[index] = f(entry),
            None => tracing::debug!(
                "mapping update ignored: index {} out of range ({} entries)",
                index,
                entries.len()
            ),
        }
        Self { entries }
    }

    pub fn with_sanitize(&self, index: usize, enabled: bool) -> Self {
        self.update(index, |entry| entry.with_sanitize(enabled))
    }

    pub fn with_operation(&self, index: usize, op: SanitizeOp) -> Self {
        self.update(index, |entry| entry.with_operation(op))
    }

    pub fn without_operation(&self, index: usize, op: SanitizeOp) -> Self {
        self.update(index, |entry| entry.without_operation(op))
    }

    pub fn with_literal_override(&self, index: usize, value: impl Into<String>) -> Self {
        let value = value.into();
        self.update(index, |entry| entry.with_literal_override(value))
    }

    pub fn coverage(&self) -> MappingCoverage {
        MappingCoverage::of(&self.entries)
    }
}

impl MappingSet<MappingEntry> {
    pub fn with_source(&self, index: usize, source: impl Into<SourceField>) -> Self {
        let source = source.into();
        self.update(index, |entry| entry.with_source(source))
    }
}

impl MappingSet<LineItemMappingEntry> {
    pub fn with_source(&self, index: usize, source: impl Into<LineItemSource>) -> Self {
        let source = source.into();
        self.update(index, |entry| entry.with_source(source))
    }
}

impl<E: FieldRule> From<Vec<E>> for MappingSet<E> {
    fn from(entries: Vec<E>) -> Self {
        Self::new(entries)
    }
}
