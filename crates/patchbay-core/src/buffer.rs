//! Audio and MIDI buffers.
//!
//! - [`AudioBuffer`] owns multichannel audio (used for graph IO and tests).
//! - [`AudioBlock`] is the view a [`Processor`](crate::Processor) sees: a set
//!   of channels borrowed from some storage, either directly or through a
//!   channel map into the graph's scratch pool.
//! - [`MidiBuffer`] holds frame-ordered [`MidiEvent`]s with preallocated
//!   capacity.
//! - [`BufferPool`] is the graph's scratch storage, sized by the render
//!   sequence compiler to the peak number of simultaneously live buffers.

/// Default number of MIDI events preallocated per buffer.
pub const DEFAULT_MIDI_CAPACITY: usize = 512;

/// Borrows one slot immutably and another mutably.
///
/// # Panics
///
/// Panics if `src == dst` or either index is out of range.
#[inline]
pub(crate) fn ref_and_mut<T>(items: &mut [T], src: usize, dst: usize) -> (&T, &mut T) {
    assert_ne!(src, dst, "ref_and_mut requires distinct indices");
    if src < dst {
        let (lo, hi) = items.split_at_mut(dst);
        (&lo[src], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(src);
        (&hi[0], &mut lo[dst])
    }
}

/// Owned multichannel audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl AudioBuffer {
    /// Creates a zeroed buffer.
    pub fn new(num_channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; num_channels],
            len,
        }
    }

    /// Wraps existing channel data. All channels are truncated to the shortest.
    pub fn from_channels(mut channels: Vec<Vec<f32>>) -> Self {
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        for ch in &mut channels {
            ch.truncate(len);
        }
        Self { channels, len }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples of channel `ch`.
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.channels[ch]
    }

    /// Mutable samples of channel `ch`.
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.channels[ch]
    }

    /// Zeroes every channel.
    pub fn clear(&mut self) {
        for ch in &mut self.channels {
            ch.fill(0.0);
        }
    }

    /// Reshapes the buffer, zeroing any new samples.
    pub fn resize(&mut self, num_channels: usize, len: usize) {
        self.channels.resize_with(num_channels, Vec::new);
        for ch in &mut self.channels {
            ch.resize(len, 0.0);
        }
        self.len = len;
    }

    /// Borrows the whole buffer as a processing block.
    pub fn as_block(&mut self) -> AudioBlock<'_> {
        AudioBlock::new(&mut self.channels, self.len)
    }
}

/// Channels handed to a processor for one process call.
///
/// Audio channels come first, then control channels. Channel accessors panic
/// on out-of-range indices, like slice indexing.
pub struct AudioBlock<'a> {
    storage: &'a mut [Vec<f32>],
    map: Option<&'a [usize]>,
    audio_channels: usize,
    control_channels: usize,
    len: usize,
}

impl<'a> AudioBlock<'a> {
    /// Uses every vector in `storage` as an audio channel of `len` frames.
    pub fn new(storage: &'a mut [Vec<f32>], len: usize) -> Self {
        debug_assert!(storage.iter().all(|ch| ch.len() >= len));
        let audio_channels = storage.len();
        Self {
            storage,
            map: None,
            audio_channels,
            control_channels: 0,
            len,
        }
    }

    /// View of pool buffers selected by `map`.
    pub(crate) fn mapped(
        storage: &'a mut [Vec<f32>],
        map: &'a [usize],
        audio_channels: usize,
        control_channels: usize,
        len: usize,
    ) -> Self {
        debug_assert_eq!(map.len(), audio_channels + control_channels);
        Self {
            storage,
            map: Some(map),
            audio_channels,
            control_channels,
            len,
        }
    }

    #[inline]
    fn slot(&self, ch: usize) -> usize {
        assert!(
            ch < self.audio_channels + self.control_channels,
            "channel {ch} out of range"
        );
        self.map.map_or(ch, |m| m[ch])
    }

    /// Frames in the block.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the block has no frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of audio channels.
    pub fn num_channels(&self) -> usize {
        self.audio_channels
    }

    /// Number of control channels.
    pub fn num_control_channels(&self) -> usize {
        self.control_channels
    }

    /// Audio channel `ch`.
    pub fn channel(&self, ch: usize) -> &[f32] {
        assert!(ch < self.audio_channels, "audio channel {ch} out of range");
        &self.storage[self.slot(ch)][..self.len]
    }

    /// Mutable audio channel `ch`.
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        assert!(ch < self.audio_channels, "audio channel {ch} out of range");
        let slot = self.slot(ch);
        &mut self.storage[slot][..self.len]
    }

    /// Control channel `ch`.
    pub fn control(&self, ch: usize) -> &[f32] {
        &self.storage[self.slot(self.audio_channels + ch)][..self.len]
    }

    /// Mutable control channel `ch`.
    pub fn control_mut(&mut self, ch: usize) -> &mut [f32] {
        let slot = self.slot(self.audio_channels + ch);
        &mut self.storage[slot][..self.len]
    }

    /// Zeroes audio channel `ch`.
    pub fn clear_channel(&mut self, ch: usize) {
        self.channel_mut(ch).fill(0.0);
    }

    /// Zeroes every audio and control channel.
    pub fn clear(&mut self) {
        let len = self.len;
        for ch in 0..self.audio_channels + self.control_channels {
            let slot = self.slot(ch);
            self.storage[slot][..len].fill(0.0);
        }
    }

    /// Copies audio channel `src` over audio channel `dst`.
    pub fn copy_channel(&mut self, src: usize, dst: usize) {
        assert!(src < self.audio_channels && dst < self.audio_channels);
        let (a, b) = (self.slot(src), self.slot(dst));
        if a != b {
            let len = self.len;
            let (from, to) = ref_and_mut(&mut *self.storage, a, b);
            to[..len].copy_from_slice(&from[..len]);
        }
    }
}

/// A short MIDI message at a frame offset within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Frame offset from the start of the block.
    pub frame: u32,
    /// Status byte followed by up to two data bytes.
    pub data: [u8; 3],
}

impl MidiEvent {
    /// Creates an event from raw bytes.
    pub fn new(frame: u32, data: [u8; 3]) -> Self {
        Self { frame, data }
    }

    /// Note-on on `channel` (0-15).
    pub fn note_on(frame: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(frame, [0x90 | (channel & 0x0f), note & 0x7f, velocity & 0x7f])
    }

    /// Note-off on `channel` (0-15).
    pub fn note_off(frame: u32, channel: u8, note: u8) -> Self {
        Self::new(frame, [0x80 | (channel & 0x0f), note & 0x7f, 0])
    }

    /// Status byte.
    pub fn status(&self) -> u8 {
        self.data[0]
    }
}

/// Frame-ordered MIDI events for one block.
///
/// Events with equal frames keep insertion order. [`push`](Self::push) grows
/// the buffer when full; [`copy_from`](Self::copy_from) and
/// [`add_from`](Self::add_from), which the graph uses while rendering, never
/// grow it and drop the events that do not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiBuffer {
    events: Vec<MidiEvent>,
}

impl MidiBuffer {
    /// Creates an empty buffer with no preallocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Inserts `event` after any events at the same or earlier frames.
    pub fn push(&mut self, event: MidiEvent) {
        let at = self.events.partition_point(|e| e.frame <= event.frame);
        self.events.insert(at, event);
    }

    /// Removes every event, keeping the allocation.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Preallocated event capacity.
    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    /// Events in frame order.
    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    /// Iterates over events in frame order.
    pub fn iter(&self) -> impl Iterator<Item = &MidiEvent> {
        self.events.iter()
    }

    /// Replaces the contents with a copy of `other`, keeping at most
    /// [`capacity`](Self::capacity) of its earliest events.
    pub fn copy_from(&mut self, other: &MidiBuffer) {
        self.events.clear();
        let n = other.events.len().min(self.events.capacity());
        self.events.extend_from_slice(&other.events[..n]);
    }

    /// Merges `other` into this buffer, preserving frame order. Events past
    /// the capacity are dropped.
    pub fn add_from(&mut self, other: &MidiBuffer) {
        if self.events.is_empty() {
            self.copy_from(other);
            return;
        }
        for event in &other.events {
            if self.events.len() == self.events.capacity() {
                break;
            }
            self.push(*event);
        }
    }

    /// Drops events at or after `len` frames.
    pub fn truncate_frames(&mut self, len: usize) {
        self.events.retain(|e| (e.frame as usize) < len);
    }
}

/// Scratch storage shared by every node in a compiled render sequence.
///
/// Sized on the control thread (or during a synchronous rebuild) and only
/// read and written, never resized, while rendering.
#[derive(Debug, Default)]
pub struct BufferPool {
    pub(crate) audio: Vec<Vec<f32>>,
    pub(crate) midi: Vec<MidiBuffer>,
    block_size: usize,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the pool to exactly `audio` channel buffers of `block_size`
    /// frames and `midi` MIDI buffers of at least `midi_capacity` events.
    pub fn ensure(&mut self, audio: usize, midi: usize, block_size: usize, midi_capacity: usize) {
        self.audio.resize_with(audio, Vec::new);
        for buf in &mut self.audio {
            buf.resize(block_size, 0.0);
        }
        self.midi
            .resize_with(midi, || MidiBuffer::with_capacity(midi_capacity));
        for buf in &mut self.midi {
            if buf.capacity() < midi_capacity {
                buf.events.reserve(midi_capacity - buf.len());
            }
        }
        self.block_size = block_size;
    }

    /// Frees all storage.
    pub fn release(&mut self) {
        self.audio = Vec::new();
        self.midi = Vec::new();
        self.block_size = 0;
    }

    /// Number of audio channel buffers.
    pub fn audio_count(&self) -> usize {
        self.audio.len()
    }

    /// Number of MIDI buffers.
    pub fn midi_count(&self) -> usize {
        self.midi.len()
    }

    /// Frames per audio buffer.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Audio buffer `idx`.
    pub fn audio(&self, idx: usize) -> &[f32] {
        &self.audio[idx]
    }

    /// Mutable audio buffer `idx`.
    pub fn audio_mut(&mut self, idx: usize) -> &mut [f32] {
        &mut self.audio[idx]
    }

    /// Borrows audio buffer `src` immutably and `dst` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `src == dst`.
    pub fn get_ref_and_mut(&mut self, src: usize, dst: usize) -> (&[f32], &mut [f32]) {
        let (a, b) = ref_and_mut(&mut self.audio, src, dst);
        (a.as_slice(), b.as_mut_slice())
    }

    /// Borrows MIDI buffer `src` immutably and `dst` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `src == dst`.
    pub fn midi_ref_and_mut(&mut self, src: usize, dst: usize) -> (&MidiBuffer, &mut MidiBuffer) {
        ref_and_mut(&mut self.midi, src, dst)
    }
}
