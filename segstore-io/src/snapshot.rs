use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use segstore_core::{FieldValue, Position, Segment};

use super::consts::{
    SEGS_HEADER, SEGS_VERSION, TAG_FLOAT, TAG_INTEGER, TAG_INTEGER_ARRAY, TAG_TEXT,
};
use super::error::{Result, SegsError};

/// Encode and decode a segment payload for durable storage.
///
/// Implementing this trait is what makes a payload type persistable; stores
/// whose payload has no codec simply cannot be configured with a snapshot.
pub trait PayloadCodec: Sized {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn decode<R: Read>(reader: &mut R) -> Result<Self>;
}

/// Unit payloads occupy no bytes; the segment bounds are the whole record.
impl PayloadCodec for () {
    fn encode<W: Write>(&self, _writer: &mut W) -> Result<()> {
        Ok(())
    }

    fn decode<R: Read>(_reader: &mut R) -> Result<Self> {
        Ok(())
    }
}

impl PayloadCodec for i64 {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_le_bytes())?;
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        read_i64(reader)
    }
}

impl PayloadCodec for String {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_bytes(writer, self.as_bytes())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(String::from_utf8(read_bytes(reader)?)?)
    }
}

/// Tagged encoding: one tag byte, then the kind-specific body.
impl PayloadCodec for FieldValue {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            FieldValue::Integer(v) => {
                writer.write_all(&TAG_INTEGER.to_le_bytes())?;
                writer.write_all(&v.to_le_bytes())?;
            }
            FieldValue::Text(v) => {
                writer.write_all(&TAG_TEXT.to_le_bytes())?;
                write_bytes(writer, v.as_bytes())?;
            }
            FieldValue::IntegerArray(v) => {
                writer.write_all(&TAG_INTEGER_ARRAY.to_le_bytes())?;
                writer.write_all(&(v.len() as u64).to_le_bytes())?;
                for item in v {
                    writer.write_all(&item.to_le_bytes())?;
                }
            }
            FieldValue::Float(v) => {
                writer.write_all(&TAG_FLOAT.to_le_bytes())?;
                writer.write_all(&v.to_le_bytes())?;
            }
        }
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let tag = read_u8(reader)?;
        match tag {
            TAG_INTEGER => Ok(FieldValue::Integer(read_i64(reader)?)),
            TAG_TEXT => Ok(FieldValue::Text(String::from_utf8(read_bytes(reader)?)?)),
            TAG_INTEGER_ARRAY => {
                let len = read_u64(reader)? as usize;
                let mut items = Vec::with_capacity(len.min(1 << 20));
                for _ in 0..len {
                    items.push(read_i64(reader)?);
                }
                Ok(FieldValue::IntegerArray(items))
            }
            TAG_FLOAT => {
                let mut buf = [0u8; 8];
                reader.read_exact(&mut buf)?;
                Ok(FieldValue::Float(f64::from_le_bytes(buf)))
            }
            other => Err(SegsError::InvalidPayloadTag(other)),
        }
    }
}

///
/// Write a full segment set to a `.segs` snapshot.
/// # Arguments
/// - path: the file to save the snapshot to
/// - segments: segments to save
///
pub fn write_segments<E>(path: &Path, segments: &[Segment<Position, E>]) -> Result<()>
where
    E: PayloadCodec + Eq + Clone + Send + Sync,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(SEGS_HEADER)?;
    writer.write_all(&SEGS_VERSION.to_le_bytes())?;
    writer.write_all(&(segments.len() as u64).to_le_bytes())?;

    for seg in segments {
        writer.write_all(&seg.start.to_le_bytes())?;
        writer.write_all(&seg.end.to_le_bytes())?;
        seg.payload.encode(&mut writer)?;
    }

    writer.flush()?;
    Ok(())
}

///
/// Read a full segment set back from a `.segs` snapshot.
/// # Arguments
/// - path: the file to read the snapshot from
///
/// # Returns
/// - the segments in the order they were written
pub fn read_segments<E>(path: &Path) -> Result<Vec<Segment<Position, E>>>
where
    E: PayloadCodec + Eq + Clone + Send + Sync,
{
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    if &header != SEGS_HEADER {
        return Err(SegsError::InvalidSegsFile);
    }

    let version = read_u8(&mut reader)?;
    if version != SEGS_VERSION {
        return Err(SegsError::UnsupportedVersion(version));
    }

    let count = read_u64(&mut reader)?;
    let mut segments = Vec::with_capacity((count as usize).min(1 << 20));
    for _ in 0..count {
        let start = read_i64(&mut reader)?;
        let end = read_i64(&mut reader)?;
        if start > end {
            return Err(SegsError::CorruptRecord(start, end));
        }
        let payload = E::decode(&mut reader)?;
        segments.push(Segment::new(start, end, payload));
    }

    Ok(segments)
}

fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(&(bytes.len() as u64).to_le_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// The length field is untrusted, so the buffer grows as bytes actually
/// arrive instead of being allocated up front; a corrupt length surfaces
/// as a short read.
fn read_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_u64(reader)? as usize;
    let mut bytes = Vec::with_capacity(len.min(1 << 20));
    let mut chunk = [0u8; 8192];
    let mut remaining = len;
    while remaining > 0 {
        let take = remaining.min(chunk.len());
        reader.read_exact(&mut chunk[..take])?;
        bytes.extend_from_slice(&chunk[..take]);
        remaining -= take;
    }
    Ok(bytes)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn field_segments() -> Vec<Segment<Position, FieldValue>> {
        vec![
            Segment::new(1, 5, FieldValue::from("sched_switch")),
            Segment::new(10, 12, FieldValue::from(42i64)),
            Segment::new(4, 4, FieldValue::from(vec![7i64, -3, 0])),
            Segment::new(0, 20, FieldValue::from(2.5f64)),
        ]
    }

    #[rstest]
    fn test_round_trip_field_values(field_segments: Vec<Segment<Position, FieldValue>>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.segs");

        write_segments(&path, &field_segments).unwrap();
        let restored: Vec<Segment<Position, FieldValue>> = read_segments(&path).unwrap();

        assert_eq!(restored, field_segments);
    }

    #[rstest]
    fn test_round_trip_unit_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bounds.segs");
        let segments: Vec<Segment<Position, ()>> = vec![
            Segment::new(i64::MIN, i64::MAX, ()),
            Segment::new(-1, 1, ()),
        ];

        write_segments(&path, &segments).unwrap();
        let restored: Vec<Segment<Position, ()>> = read_segments(&path).unwrap();

        assert_eq!(restored, segments);
    }

    #[rstest]
    fn test_round_trip_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.segs");
        let segments: Vec<Segment<Position, String>> = vec![];

        write_segments(&path, &segments).unwrap();
        let restored: Vec<Segment<Position, String>> = read_segments(&path).unwrap();

        assert!(restored.is_empty());
    }

    #[rstest]
    fn test_creates_parent_directories(field_segments: Vec<Segment<Position, FieldValue>>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/session.segs");

        write_segments(&path, &field_segments).unwrap();
        assert!(path.exists());
    }

    #[rstest]
    fn test_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_snapshot.segs");
        std::fs::write(&path, b"plain text, definitely not a snapshot").unwrap();

        let result: Result<Vec<Segment<Position, ()>>> = read_segments(&path);
        assert!(matches!(result, Err(SegsError::InvalidSegsFile)));
    }

    #[rstest]
    fn test_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.segs");
        let mut bytes = SEGS_HEADER.to_vec();
        bytes.push(99);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let result: Result<Vec<Segment<Position, ()>>> = read_segments(&path);
        assert!(matches!(result, Err(SegsError::UnsupportedVersion(99))));
    }

    #[rstest]
    fn test_rejects_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.segs");
        let mut bytes = SEGS_HEADER.to_vec();
        bytes.push(SEGS_VERSION);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&5i64.to_le_bytes()); // start after end
        bytes.extend_from_slice(&(-5i64).to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let result: Result<Vec<Segment<Position, ()>>> = read_segments(&path);
        assert!(matches!(result, Err(SegsError::CorruptRecord(5, -5))));
    }

    #[rstest]
    fn test_huge_claimed_text_length_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_len.segs");
        let mut bytes = SEGS_HEADER.to_vec();
        bytes.push(SEGS_VERSION);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(&1i64.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes()); // claimed payload length
        std::fs::write(&path, bytes).unwrap();

        let result: Result<Vec<Segment<Position, String>>> = read_segments(&path);
        assert!(matches!(result, Err(SegsError::Io(_))));
    }

    #[rstest]
    fn test_truncated_snapshot_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.segs");
        let mut bytes = SEGS_HEADER.to_vec();
        bytes.push(SEGS_VERSION);
        bytes.extend_from_slice(&3u64.to_le_bytes()); // claims 3 records, has none
        std::fs::write(&path, bytes).unwrap();

        let result: Result<Vec<Segment<Position, i64>>> = read_segments(&path);
        assert!(matches!(result, Err(SegsError::Io(_))));
    }
}
