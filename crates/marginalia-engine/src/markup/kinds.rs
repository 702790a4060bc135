pub struct Annotation;

impl Annotation {
    /// Double-pipe fence on either side of the context phrase.
    pub const FENCE: &'static [u8; 2] = b"||";
    pub const NOTE_OPEN: u8 = b'(';
    pub const NOTE_CLOSE: u8 = b')';
}
