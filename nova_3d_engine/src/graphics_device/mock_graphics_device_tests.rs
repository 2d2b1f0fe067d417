//! Unit tests for the mock graphics device

use std::sync::Arc;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    GraphicsDevice, Swapchain, CommandList, Buffer, BufferDesc, BufferUsage,
    Extent2D, AcquireResult, Pipeline, ShaderStageFlags,
};

#[test]
fn test_mock_command_list_records_sequence() {
    let mut cmd = MockCommandList::new();
    cmd.begin().unwrap();
    let pipeline: Arc<dyn Pipeline> = Arc::new(MockPipeline);
    cmd.bind_pipeline(&pipeline).unwrap();
    cmd.push_constants(ShaderStageFlags::ALL_GRAPHICS, 0, &[0u8; 128]).unwrap();
    cmd.end().unwrap();

    let commands = cmd.commands.lock().unwrap();
    assert_eq!(
        *commands,
        vec!["begin", "bind_pipeline", "push_constants(0, 128 bytes)", "end"]
    );
}

#[test]
fn test_mock_command_list_rejects_draw_outside_render_pass() {
    let mut cmd = MockCommandList::new();
    cmd.begin().unwrap();
    assert!(cmd.draw(3, 0).is_err());
}

#[test]
fn test_mock_command_list_begin_clears_previous_recording() {
    let mut cmd = MockCommandList::new();
    cmd.begin().unwrap();
    cmd.end().unwrap();
    cmd.begin().unwrap();

    let commands = cmd.commands.lock().unwrap();
    assert_eq!(*commands, vec!["begin"]);
}

#[test]
fn test_mock_buffer_round_trip() {
    let buffer = MockBuffer::new(16, BufferUsage::Uniform);
    buffer.update(4, &[1, 2, 3, 4]).unwrap();
    assert_eq!(buffer.read_back(4, 4), vec![1, 2, 3, 4]);
    buffer.flush(0, 16).unwrap();
    assert_eq!(buffer.flush_count(), 1);
}

#[test]
fn test_mock_buffer_rejects_device_local_update() {
    let buffer = MockBuffer::new(16, BufferUsage::Vertex);
    assert!(buffer.update(0, &[0u8; 4]).is_err());
}

#[test]
fn test_mock_swapchain_scripted_acquire() {
    let mut swapchain = MockSwapchain::new(2, 3, Extent2D::new(800, 600));
    let state = swapchain.state();
    state.lock().unwrap().acquire_script.push_back(AcquireResult::OutOfDate);

    assert_eq!(swapchain.acquire_next_image().unwrap(), AcquireResult::OutOfDate);
    // Script exhausted: next acquire succeeds round-robin.
    assert_eq!(swapchain.acquire_next_image().unwrap(), AcquireResult::Acquired(0));
}

#[test]
fn test_mock_swapchain_fence_only_after_submission() {
    let mut swapchain = MockSwapchain::new(2, 2, Extent2D::new(800, 600));
    let state = swapchain.state();
    let cmd = MockCommandList::new();

    // First use of each slot: no fence wait.
    swapchain.acquire_next_image().unwrap();
    swapchain.submit_and_present(&cmd, 0).unwrap();
    swapchain.acquire_next_image().unwrap();
    swapchain.submit_and_present(&cmd, 1).unwrap();
    // Slot 0 reused: fence wait recorded.
    swapchain.acquire_next_image().unwrap();

    let events = &state.lock().unwrap().events;
    assert!(!events[..4].iter().any(|e| e.starts_with("wait_fence")));
    assert_eq!(events[4], "wait_fence(0)");
}

#[test]
fn test_mock_swapchain_recreate_rejects_degenerate_extent() {
    let mut swapchain = MockSwapchain::new(2, 2, Extent2D::new(800, 600));
    match swapchain.recreate(Extent2D::new(0, 600)) {
        Err(Error::SurfaceLost(_)) => {}
        other => panic!("expected SurfaceLost, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_mock_device_tracks_created_resources() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();

    device.create_command_list().unwrap();
    let buffer = device
        .create_buffer(
            BufferDesc { size: 64, usage: BufferUsage::Uniform },
            None,
        )
        .unwrap();
    device.create_frame_binding_group(&buffer).unwrap();
    device.wait_idle().unwrap();

    let state = state.lock().unwrap();
    assert_eq!(
        state.events,
        vec![
            "create_command_list",
            "create_buffer(Uniform, 64)",
            "create_frame_binding_group",
            "wait_idle"
        ]
    );
    assert_eq!(state.command_lists.len(), 1);
    assert_eq!(state.buffers.len(), 1);
}

#[test]
fn test_mock_device_binding_group_exhaustion() {
    let mut device = MockGraphicsDevice::new();
    let state = device.state();
    let buffer = device
        .create_buffer(
            BufferDesc { size: 64, usage: BufferUsage::Uniform },
            None,
        )
        .unwrap();

    state.lock().unwrap().exhaust_binding_groups = true;
    match device.create_frame_binding_group(&buffer) {
        Err(Error::OutOfMemory) => {}
        other => panic!("expected OutOfMemory, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_mock_extent_provider_script() {
    use crate::graphics_device::SurfaceExtentProvider;

    let mut provider = MockExtentProvider::new(
        vec![Extent2D::new(0, 0), Extent2D::new(0, 0)],
        Extent2D::new(1024, 768),
    );

    assert!(provider.surface_extent().is_degenerate());
    assert!(provider.surface_extent().is_degenerate());
    assert_eq!(provider.surface_extent(), Extent2D::new(1024, 768));
    assert_eq!(*provider.polls.lock().unwrap(), 3);
}
